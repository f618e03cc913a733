use flate2::read::GzDecoder;
use indicatif::ProgressBar;
use quick_xml::events::Event as XmlEvent;

use std::{
    ffi,
    io::{self, Write},
};

use crate::{util, Result};

/// Walk the gzipped corpus xml in `input` and write the text content of
/// every paragraph, inline marks included, as a single line in `output`.
/// Return the number of lines written.
pub fn to_plain_text(input: &ffi::OsStr, output: &ffi::OsStr) -> Result<usize> {
    let gz = GzDecoder::new(util::open_file_r(input)?);
    let mut reader = quick_xml::Reader::from_reader(io::BufReader::new(gz));
    let mut out = io::BufWriter::new(util::create_file_w(output)?);

    let pb = ProgressBar::new(0);
    let mut buf = vec![];
    let mut text = String::new();
    let mut in_para = false;
    let mut n_lines = 0;

    loop {
        match err_at!(DecodeFail, reader.read_event_into(&mut buf))? {
            XmlEvent::Start(e) => match e.name().as_ref() {
                b"wikipedia" => {
                    for attr in e.attributes() {
                        let attr = err_at!(DecodeFail, attr)?;
                        if attr.key.as_ref() == b"article" {
                            let value = err_at!(DecodeFail, attr.unescape_value())?;
                            if let Ok(n) = value.parse::<u64>() {
                                pb.set_length(n);
                            }
                        }
                    }
                }
                b"p" => {
                    in_para = true;
                    text.clear();
                }
                _ => (),
            },
            XmlEvent::End(e) => match e.name().as_ref() {
                b"p" => {
                    in_para = false;
                    err_at!(IOError, out.write_all(text.as_bytes()))?;
                    err_at!(IOError, out.write_all(b"\n"))?;
                    n_lines += 1;
                }
                b"article" => pb.inc(1),
                _ => (),
            },
            XmlEvent::Text(e) if in_para => {
                text.push_str(&err_at!(DecodeFail, e.unescape())?);
            }
            XmlEvent::Eof => break,
            _ => (),
        }
        buf.clear();
    }
    pb.finish();

    err_at!(IOError, out.flush())?;
    Ok(n_lines)
}

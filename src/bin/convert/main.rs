use structopt::StructOpt;

use std::ffi;

use wikicorpus::wiki;

/// Convert the gzipped xml corpus into plain text, one paragraph per
/// line.
#[derive(Clone, StructOpt)]
pub struct Opt {
    /// gzipped xml corpus, produced by the extract binary
    input: ffi::OsString,

    /// plain-text output location
    output: ffi::OsString,
}

fn main() {
    env_logger::init();

    let opts = Opt::from_args();
    match wiki::to_plain_text(&opts.input, &opts.output) {
        Ok(n) => eprintln!("wrote {} paragraphs into {:?}", n, opts.output),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

use structopt::StructOpt;

use std::ffi;

use wikicorpus::{err_at, wiki, zimf::Zimf, Result};

mod print;

/// Options for extract
#[derive(Clone, StructOpt)]
pub struct Opt {
    /// print archive information and exit
    #[structopt(long = "info")]
    info: bool,

    /// with --info, print in json format
    #[structopt(long = "json")]
    json: bool,

    /// with --info, colorize the tables
    #[structopt(long = "color")]
    color: bool,

    /// zim archive to extract from
    zim_file: ffi::OsString,

    /// gzipped xml output location
    output: Option<ffi::OsString>,

    /// snapshot language code (en, fr, de, it ...)
    lang: Option<String>,
}

fn main() {
    env_logger::init();

    let opts = Opt::from_args();
    match run(opts) {
        Ok(()) => (),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(opts: Opt) -> Result<()> {
    let mut z = Zimf::open(&opts.zim_file)?;

    if opts.info {
        if opts.json {
            println!("{}", z.to_json());
        } else {
            print::make_info_table(&z).print_tty(opts.color);
            println!();
            print::make_header_table(z.as_header()).print_tty(opts.color);
            println!();
            print::make_mimes_table(&z).print_tty(opts.color);
        }
        return Ok(());
    }

    let (output, lang) = match (opts.output, opts.lang) {
        (Some(output), Some(lang)) => (output, lang),
        _ => err_at!(InvalidInput, msg: "need <output> and <lang> arguments")?,
    };

    let stats = wiki::export(&mut z, &output, &lang)?;

    let mut tags: Vec<(String, usize)> = stats.unknown_tags.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    eprintln!("Unknown tags:");
    for (tag, count) in tags.into_iter() {
        eprintln!("  {}: {}", tag, count);
    }
    eprintln!(
        "extracted {} articles, {} redirects into {:?}",
        stats.n_articles, stats.n_redirects, output
    );

    Ok(())
}

use structopt::StructOpt;

use std::ffi;

use wikicorpus::{nltk, Result};

/// Options for nltk
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(subcommand)]
    subcmd: SubCommand,
}

#[derive(Clone, StructOpt)]
pub enum SubCommand {
    /// normalize-subcommand, fold text to the restricted character set,
    /// line by line.
    Normalize {
        /// plain-text input
        input: ffi::OsString,

        /// normalized output location
        output: ffi::OsString,

        /// drop lines shorter than this, after normalization
        #[structopt(long = "min-length", default_value = "100")]
        min_length: usize,
    },
    /// tokenize-subcommand, split text into simplified tokens, line by
    /// line.
    Tokenize {
        /// plain-text input
        input: ffi::OsString,

        /// tokenized output location
        output: ffi::OsString,

        /// drop lines with fewer tokens than this
        #[structopt(long = "min-tokens", default_value = "10")]
        min_tokens: usize,
    },
}

fn main() {
    env_logger::init();

    let opts = Opt::from_args();
    let res: Result<(usize, usize)> = match opts.subcmd {
        SubCommand::Normalize {
            input,
            output,
            min_length,
        } => nltk::normalize_file(&input, &output, min_length),
        SubCommand::Tokenize {
            input,
            output,
            min_tokens,
        } => nltk::tokenize_file(&input, &output, min_tokens),
    };

    match res {
        Ok((n_kept, n_total)) => eprintln!("kept {}/{} lines", n_kept, n_total),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

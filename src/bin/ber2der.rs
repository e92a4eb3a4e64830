//! Rewrites BER encoded files as canonical DER.
//!
//! Each argument names a file holding a single BER encoded value, for
//! instance a certificate. The canonical encoding is written next to the
//! input as `<path>.der`. Files that do not parse as BER are reported and
//! skipped.

use std::{env, fs};
use bytes::Bytes;
use ber2der::{Options, Transcoder};

fn process_one(transcoder: &Transcoder, arg: &str) -> Result<(), String> {
    let data = fs::read(arg).map_err(|err| err.to_string())?;
    let der = transcoder.canonicalize(Bytes::from(data)).map_err(|err| {
        err.to_string()
    })?;
    let target = format!("{}.der", arg);
    fs::write(&target, &der).map_err(|err| err.to_string())?;
    println!("{} -> {}", arg, target);
    Ok(())
}

fn main() {
    let transcoder = Transcoder::new(Options::der());
    let mut args = env::args();
    args.next().unwrap(); // Skip executable name.
    for arg in args {
        if let Err(err) = process_one(&transcoder, arg.as_ref()) {
            println!("{}: {}.", arg, err)
        }
    }
}

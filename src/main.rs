// src/main.rs

// Watches files, FIFOs or stdin and prints readiness as it happens.
//
//     readypoll [PATH...]
//
// Each ready source prints "<label> <events>", plus how many bytes were
// drained when it was readable. A source is dropped once it reaches EOF or
// only reports hangup/error.

use anyhow::Context;
use log::{debug, error, info};
use std::fs::File;
use std::io::{self, Read};
use std::os::unix::io::AsFd;

use readypoll::config::CONFIG;
use readypoll::{Descriptor, PollError, PollEvents, PollRecord, Pollset};

const READ_CHUNK: usize = 4096;

struct Source {
    label: String,
    descriptor: Descriptor,
    reader: Box<dyn Read>,
}

fn open_sources(paths: &[String]) -> anyhow::Result<Vec<Source>> {
    if paths.is_empty() {
        // `io::Stdin` buffers, and bytes parked in its buffer never show up
        // as readiness again. Read a private fd of our own instead.
        let stdin = File::from(
            nix::unistd::dup(io::stdin().as_fd()).context("Failed to duplicate stdin")?,
        );
        return Ok(vec![Source {
            label: "<stdin>".to_string(),
            descriptor: Descriptor::file(&stdin),
            reader: Box::new(stdin),
        }]);
    }
    paths
        .iter()
        .map(|path| -> anyhow::Result<Source> {
            let file = File::open(path)
                .with_context(|| format!("Failed to open '{}' for watching", path))?;
            Ok(Source {
                label: path.clone(),
                descriptor: Descriptor::file(&file),
                reader: Box::new(file),
            })
        })
        .collect()
}

/// Reads what is available. Returns false once the source hit EOF.
fn drain(source: &mut Source, buf: &mut [u8]) -> anyhow::Result<bool> {
    match source.reader.read(buf) {
        Ok(0) => Ok(false),
        Ok(n) => {
            println!("{} read {} bytes", source.label, n);
            Ok(true)
        }
        Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => {
            Ok(true)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read from '{}'", source.label)),
    }
}

fn run(paths: Vec<String>) -> anyhow::Result<()> {
    let config = &*CONFIG;
    // Sources stay open for the whole run; the pollset only refers to their fds.
    let mut sources = open_sources(&paths)?;
    info!(
        "Watching {} source(s) for {} (timeout {}us)",
        sources.len(),
        config.watch.events,
        config.poll.timeout_us
    );

    let mut pollset: Pollset<usize> =
        Pollset::create(config.watch.capacity).context("Failed to create pollset")?;
    for (index, source) in sources.iter().enumerate() {
        pollset
            .add(PollRecord::with_payload(
                source.descriptor,
                config.watch.events,
                index,
            ))
            .with_context(|| format!("Failed to watch '{}'", source.label))?;
    }

    let mut buf = vec![0u8; READ_CHUNK];
    let mut round: u64 = 0;
    while !pollset.is_empty() {
        if config.watch.max_rounds.is_some_and(|max| round >= max) {
            info!("Reached {} rounds, stopping.", round);
            break;
        }
        round += 1;

        let ready: Vec<PollRecord<usize>> = match pollset.poll(config.poll.timeout_us) {
            Ok(ready) => ready.to_vec(),
            Err(PollError::TimedOut) => {
                debug!("Round {}: nothing ready", round);
                continue;
            }
            Err(e) => return Err(e).context("Pollset wait failed"),
        };

        for record in &ready {
            let source = &mut sources[record.payload];
            println!("{} {}", source.label, record.returned);

            let mut alive = record
                .returned
                .intersects(PollEvents::READABLE | PollEvents::WRITABLE);
            if record.returned.contains(PollEvents::READABLE) {
                alive = drain(source, &mut buf)?;
            }
            if !alive {
                info!("'{}' is done ({})", source.label, record.returned);
                match pollset.remove(source.descriptor) {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e).context("Failed to stop watching"),
                }
            }
        }
    }

    pollset.destroy().context("Failed to destroy pollset")?;
    Ok(())
}

/// Main entry point for the `readypoll` watcher.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(paths) {
        error!("readypoll failed: {:#}. Root cause: {:?}", e, e.root_cause());
        return Err(e);
    }
    info!("readypoll exiting normally.");
    Ok(())
}

//! Append-only file replay.
//!
//! Rebuilds registry state at startup by re-applying logged commands in
//! order. Replay bypasses the feed path entirely, so recovered mutations are
//! never logged a second time. Namespaces are materialized implicitly: the
//! log records only mutations, not namespace creation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use super::frame::FrameReader;
use crate::error::aof::AofError;
use crate::store::Registry;

/// Replays the log at `path` into `registry`, returning the number of frames
/// applied. A missing file is an empty log.
///
/// Frames are dispatched on arity: 4 is an insert, 3 is a remove. Any other
/// arity, a namespace that is not UTF-8, or a malformed frame aborts the
/// replay with [`AofError::Format`]; frames before the bad one stay applied.
pub fn load<P: AsRef<Path>>(path: P, registry: &Registry) -> Result<u64, AofError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no AOF found, starting empty");
            return Ok(0);
        }
        Err(err) => return Err(AofError::Io(err)),
    };

    let mut reader = FrameReader::new(BufReader::new(file));
    let mut applied = 0u64;

    while let Some(frame) = reader.read_frame()? {
        match frame.len() {
            4 => {
                let namespace = namespace_utf8(&reader, &frame[1])?;
                let value = if frame[3].is_empty() {
                    None
                } else {
                    Some(frame[3].as_slice())
                };
                registry.apply_insert(namespace, &frame[2], value);
            }
            3 => {
                let namespace = namespace_utf8(&reader, &frame[1])?;
                registry.apply_remove(namespace, &frame[2]);
            }
            arity => {
                return Err(AofError::Format {
                    offset: reader.offset(),
                    message: format!("unsupported frame arity {arity}"),
                })
            }
        }
        applied += 1;
    }

    info!(frames = applied, path = %path.display(), "AOF replay complete");
    Ok(applied)
}

fn namespace_utf8<'f, R>(reader: &FrameReader<R>, raw: &'f [u8]) -> Result<&'f str, AofError> {
    std::str::from_utf8(raw).map_err(|_| AofError::Format {
        offset: reader.offset(),
        message: "namespace is not valid UTF-8".to_string(),
    })
}

//! Child processes with an extra output descriptor
//!
//! The builder reports structured status on a descriptor other than its
//! standard streams. [`spawn_with_auxiliary_channel`] creates a pipe, maps
//! its write end to a fixed descriptor number in the child, and hands back
//! the read end as an async reader.

use std::io;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use tokio::net::unix::pipe;
use tokio::process::{Child, Command};

/// Spawn `cmd` with the write end of a fresh pipe installed as `child_fd`.
///
/// The parent's copy of the write end is closed before returning, so the
/// reader sees end-of-stream once the child (and anything it forked)
/// closes its copy. Both pipe ends are closed on every error path.
pub fn spawn_with_auxiliary_channel(
    cmd: &mut Command,
    child_fd: RawFd,
) -> io::Result<(Child, pipe::Receiver)> {
    let (reader, writer) = io::pipe()?;
    let writer_fd = writer.as_raw_fd();

    install_descriptor(cmd, writer_fd, child_fd);
    let child = cmd.spawn()?;
    drop(writer);

    let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
    Ok((child, receiver))
}

#[allow(unsafe_code)]
fn install_descriptor(cmd: &mut Command, from: RawFd, to: RawFd) {
    // SAFETY: the hook runs between fork and exec and only calls the
    // async-signal-safe functions dup2 and fcntl.
    unsafe {
        cmd.pre_exec(move || {
            if from == to {
                // already in place; only the close-on-exec flag must go
                let flags = libc::fcntl(to, libc::F_GETFD);
                if flags < 0 || libc::fcntl(to, libc::F_SETFD, flags & !libc::FD_CLOEXEC) < 0 {
                    return Err(io::Error::last_os_error());
                }
            } else if libc::dup2(from, to) < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Stdio;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_child_writes_to_extra_descriptor() {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c")
            .arg("echo hello >&3")
            .stdin(Stdio::null())
            .stdout(Stdio::null());

        let (mut child, mut receiver) = spawn_with_auxiliary_channel(&mut cmd, 3).unwrap();
        let mut received = String::new();
        receiver.read_to_string(&mut received).await.unwrap();

        assert_eq!(received, "hello\n");
        assert!(child.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_reader_sees_eof_when_child_exits_silently() {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg("exit 0").stdin(Stdio::null());

        let (mut child, mut receiver) = spawn_with_auxiliary_channel(&mut cmd, 3).unwrap();
        let mut received = Vec::new();
        receiver.read_to_end(&mut received).await.unwrap();

        assert!(received.is_empty());
        assert!(child.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let mut cmd = Command::new("/nonexistent/builder");
        let result = spawn_with_auxiliary_channel(&mut cmd, 3);
        assert!(result.is_err());
    }
}

//! Process-tree termination.
//!
//! Children are spawned as leaders of their own process group so a timeout
//! can signal the whole tree (agent CLIs fork shells, node workers, docker
//! clients) rather than only the immediate handle.

use std::process::{Child, Command};

/// Make the spawned child the leader of a new process group.
#[cfg(unix)]
pub fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
pub fn isolate_process_group(_command: &mut Command) {}

/// Hard-kill the child's process group and reap the child.
#[cfg(unix)]
pub fn kill_tree(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;

    // SAFETY: kill(2) with a negative pid signals the process group we created
    // at spawn time; ESRCH just means it is already gone.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pid = pgid, error = %err, "failed to signal process group");
        }
    }

    // On Unix this is SIGKILL to the leader, a no-op if the group kill landed.
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(not(unix))]
pub fn kill_tree(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

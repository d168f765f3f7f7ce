// src/core/os.rs

use crate::{
    core::{action::Action, multi_parts::multi_parts},
    models::Context,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::{fs, path::PathBuf};

lazy_static! {
    // First column of a known_hosts entry.
    static ref HOST_RE: Regex = Regex::new(r"^(?P<host>[^ ,#]+)").expect("host regex is valid");
}

const PASSWD_PATH: &str = "/etc/passwd";
const GROUP_PATH: &str = "/etc/group";
const NET_CLASS_PATH: &str = "/sys/class/net";

/// POSIX signals accepted by `kill -s`, with their default action.
const KILL_SIGNALS: &[(&str, &str)] = &[
    ("ABRT", "Abnormal termination"),
    ("ALRM", "Virtual alarm clock"),
    ("BUS", "BUS error"),
    ("CHLD", "Child status has changed"),
    ("CONT", "Continue stopped process"),
    ("FPE", "Floating-point exception"),
    ("HUP", "Hangup detected on controlling terminal"),
    ("ILL", "Illegal instruction"),
    ("INT", "Interrupt from keyboard"),
    ("KILL", "Kill, unblockable"),
    ("PIPE", "Broken pipe"),
    ("POLL", "Pollable event occurred"),
    ("PROF", "Profiling alarm clock timer expired"),
    ("PWR", "Power failure restart"),
    ("QUIT", "Quit from keyboard"),
    ("SEGV", "Segmentation violation"),
    ("STKFLT", "Stack fault on coprocessor"),
    ("STOP", "Stop process, unblockable"),
    ("SYS", "Bad system call"),
    ("TERM", "Termination request"),
    ("TRAP", "Trace/breakpoint trap"),
    ("TSTP", "Stop typed at keyboard"),
    ("TTIN", "Background read from tty"),
    ("TTOU", "Background write to tty"),
    ("URG", "Urgent condition on socket"),
    ("USR1", "User-defined signal 1"),
    ("USR2", "User-defined signal 2"),
    ("VTALRM", "Virtual alarm clock"),
    ("WINCH", "Window size change"),
    ("XCPU", "CPU time limit exceeded"),
    ("XFSZ", "File size limit exceeded"),
];

/// Completes `true` and `false`.
pub fn action_bool() -> Action {
    Action::values(["true", "false"])
}

/// Completes user names from the passwd database.
pub fn action_users() -> Action {
    action_first_column(PathBuf::from(PASSWD_PATH))
}

/// Completes group names from the group database.
pub fn action_groups() -> Action {
    action_first_column(PathBuf::from(GROUP_PATH))
}

/// Completes `user:group` pairs.
pub fn action_user_group() -> Action {
    multi_parts(":", |c: &Context| {
        Ok(match c.parts.len() {
            0 => action_users().invoke(c)?.suffix(":").into_action(),
            1 => action_groups(),
            _ => Action::default(),
        })
    })
}

/// Completes host names from `~/.ssh/known_hosts`.
pub fn action_hosts() -> Action {
    Action::callback(|_| match dirs::home_dir() {
        Some(home) => Ok(action_known_hosts(home.join(".ssh").join("known_hosts"))),
        None => Ok(Action::message("Could not find home directory")),
    })
}

/// Completes signal names for `kill`.
pub fn action_kill_signals() -> Action {
    Action::values_described(KILL_SIGNALS.iter().copied())
}

/// Completes network interface names.
pub fn action_net_interfaces() -> Action {
    action_directory_entries(PathBuf::from(NET_CLASS_PATH))
}

/// Completes the entry names of `path`, sorted.
fn action_directory_entries(path: PathBuf) -> Action {
    Action::callback(move |_| match fs::read_dir(&path) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            Ok(Action::values(names))
        }
        Err(e) => Ok(Action::message(format!("{}: {}", path.display(), e))),
    })
}

fn action_known_hosts(path: PathBuf) -> Action {
    Action::callback(move |_| match fs::read_to_string(&path) {
        Ok(content) => Ok(Action::values(
            content
                .lines()
                .filter_map(|line| HOST_RE.captures(line))
                .filter_map(|caps| caps.name("host").map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>(),
        )),
        Err(e) => Ok(Action::message(format!("{}: {}", path.display(), e))),
    })
}

/// Completes the first `:`-separated column of every line in `path`.
fn action_first_column(path: PathBuf) -> Action {
    Action::callback(move |_| match fs::read_to_string(&path) {
        Ok(content) => Ok(Action::values(
            content
                .lines()
                .filter_map(|line| line.split(':').next())
                .map(str::trim)
                .filter(|name| !name.is_empty() && !name.starts_with('#'))
                .map(str::to_string)
                .collect::<Vec<_>>(),
        )),
        Err(e) => Ok(Action::message(format!("{}: {}", path.display(), e))),
    })
}

use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tempfile::TempDir;

pub struct TestSink {
    pub directory: TempDir,
    pub socket_path: PathBuf,
    handle: JoinHandle<Vec<String>>,
}

impl TestSink {
    /// Accepts a single connection and collects its lines until EOF.
    pub fn start() -> Self {
        let directory = tempfile::tempdir().expect("cannot create temp dir");
        let socket_path = directory.path().join("agent.sock");
        let listener = UnixListener::bind(&socket_path).expect("cannot bind test socket");
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("cannot accept connection");
            BufReader::new(stream)
                .lines()
                .map(|line| line.expect("cannot read line"))
                .collect()
        });
        Self {
            directory,
            socket_path,
            handle,
        }
    }

    pub fn lines(self) -> Vec<String> {
        self.handle.join().expect("sink thread panicked")
    }
}

pub fn write_config(directory: &Path, socket_path: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let mut contents = format!(
        "# test configuration\nsocket_path = {}\n",
        socket_path.display()
    );
    for (key, value) in entries {
        contents.push_str(&format!("{key} = {value}\n"));
    }
    let path = directory.join("injector_config.conf");
    std::fs::write(&path, contents).expect("cannot write config");
    path
}

/// Extracts the `Messages:` value of the last statistics line.
pub fn messages_sent(stdout: &str) -> u64 {
    stdout
        .lines()
        .filter_map(|line| line.split(" | ").find(|part| part.starts_with("Messages: ")))
        .last()
        .and_then(|part| part.trim_start_matches("Messages: ").parse().ok())
        .expect("no statistics line in output")
}

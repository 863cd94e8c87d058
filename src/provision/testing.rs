//! In-memory collaborators for provisioning tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{ProvisionError, Result};
use crate::fetch::{ArchiveFetcher, FetchRequest};
use crate::shell::{Invocation, ProcessRunner};

/// Serves canned archives keyed by URL and records every request.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    archives: HashMap<String, Vec<(String, String)>>,
    requests: RefCell<Vec<FetchRequest>>,
}

impl FakeFetcher {
    pub(crate) fn with_archive(mut self, url: &str, files: &[(&str, &str)]) -> Self {
        self.archives.insert(
            url.to_string(),
            files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        );
        self
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }

    pub(crate) fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }
}

impl ArchiveFetcher for FakeFetcher {
    fn fetch_and_extract(&self, request: &FetchRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        let files = self
            .archives
            .get(&request.url)
            .ok_or_else(|| ProvisionError::Download {
                url: request.url.clone(),
                message: "HTTP 404 Not Found".to_string(),
            })?;

        for (rel, content) in files {
            let path = request.destination.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(())
    }
}

/// Records invocations. Can create a file in the working directory when
/// a given program runs, or fail it.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    creates: Vec<(String, String)>,
    fail: Option<String>,
}

impl RecordingRunner {
    /// When a program named `program` runs, create `file` in its cwd.
    pub(crate) fn creating(mut self, program: &str, file: &str) -> Self {
        self.creates.push((program.to_string(), file.to_string()));
        self
    }

    /// Fail any invocation whose command line contains `needle`.
    pub(crate) fn failing(mut self, needle: &str) -> Self {
        self.fail = Some(needle.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls.borrow_mut().push(invocation.clone());
        let command = invocation.display();

        if self.fail.as_deref().is_some_and(|n| command.contains(n)) {
            return Err(ProvisionError::CommandFailed {
                command,
                code: Some(1),
            });
        }

        let name = invocation
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for (program, file) in &self.creates {
            if *program == name {
                fs::write(invocation.cwd.join(file), "")?;
            }
        }
        Ok(())
    }
}

/// Relative path and content of every file under `root`, sorted.
pub(crate) fn snapshot_tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("script `{0}` not found")]
    NotFound(String),
    #[error("invalid script name `{0}`")]
    InvalidName(String),
    #[error("failed to read script `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file lookup service handing out the raw bytes of compiled scripts by name.
pub trait ScriptSource {
    fn read(&self, name: &str) -> Result<Bytes, SourceError>;
}

/// Scripts stored as files under one directory.
///
/// Names without an extension get `.int` appended. Lookup tries the name as given, then its
/// lower-cased form, since script archives are usually extracted with mixed case.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, name: &str) -> Result<Vec<PathBuf>, SourceError> {
        let relative = Path::new(name);
        if name.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(SourceError::InvalidName(name.to_string()));
        }
        let with_ext = if relative.extension().is_some() {
            relative.to_path_buf()
        } else {
            relative.with_extension("int")
        };
        let lower = PathBuf::from(with_ext.to_string_lossy().to_lowercase());
        let mut out = vec![self.root.join(&with_ext)];
        if lower != with_ext {
            out.push(self.root.join(lower));
        }
        Ok(out)
    }
}

impl ScriptSource for DirectorySource {
    fn read(&self, name: &str) -> Result<Bytes, SourceError> {
        for path in self.candidates(name)? {
            match std::fs::read(&path) {
                Ok(bytes) => {
                    trace!(?path, len = bytes.len(), "Read script file");
                    return Ok(Bytes::from(bytes));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(SourceError::Io {
                        name: name.to_string(),
                        source,
                    });
                }
            }
        }
        Err(SourceError::NotFound(name.to_string()))
    }
}

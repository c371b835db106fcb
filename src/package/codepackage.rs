// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::{io, Error};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const CODE_TAR_NAME: &str = "code.tar";
pub const IMAGE_TAR_NAME: &str = "image.tar";
pub const APP_CONFIG_NAME: &str = "app.toml";
pub const TEST_DIR_NAME: &str = "tests";

/// The members of an application package, as paths on the local
/// filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePackage {
    pub code_tar: PathBuf,
    pub image_tar: PathBuf,
    pub config_path: PathBuf,
    pub test_dir: Option<PathBuf>,
}

/// Archive the content of the directory `dir` into `output`, entries
/// relative to the directory root.
pub fn archive_code(dir: &Path, output: &Path) -> Result<(), Error> {
    if !dir.is_dir() {
        return Err(Error::MissingPackageMember(dir.display().to_string()));
    }

    let file = File::create(output).map_err(|e| io(output, e))?;
    let mut builder = tar::Builder::new(file);
    builder.follow_symlinks(false);

    debug!("archiving {} into {}", dir.display(), output.display());
    builder.append_dir_all(".", dir).map_err(|e| io(dir, e))?;

    builder
        .into_inner()
        .and_then(|f| f.sync_all())
        .map_err(|e| io(output, e))
}

impl CodePackage {
    /// Bundle the members into a single tar archive at `output`.
    pub fn create(&self, output: &Path) -> Result<(), Error> {
        let file = File::create(output).map_err(|e| io(output, e))?;
        let mut builder = tar::Builder::new(file);

        for (src, name) in [
            (&self.code_tar, CODE_TAR_NAME),
            (&self.image_tar, IMAGE_TAR_NAME),
            (&self.config_path, APP_CONFIG_NAME),
        ] {
            debug!("adding {} as {name}", src.display());
            builder
                .append_path_with_name(src, name)
                .map_err(|e| io(src, e))?;
        }

        if let Some(tests) = &self.test_dir {
            debug!("adding {} as {TEST_DIR_NAME}/", tests.display());
            builder
                .append_dir_all(TEST_DIR_NAME, tests)
                .map_err(|e| io(tests, e))?;
        }

        builder
            .into_inner()
            .and_then(|f| f.sync_all())
            .map_err(|e| io(output, e))
    }

    /// Unpack the archive at `archive` into `dest` and locate its members.
    ///
    /// The required members are checked in a fixed order (code archive,
    /// image, configuration) and the first one missing is reported.  Only
    /// what the archive itself carries counts: members left in `dest` by an
    /// earlier package are removed first.  Members whose path would land
    /// outside of `dest` are refused.
    pub fn extract(archive: &Path, dest: &Path) -> Result<Self, Error> {
        let file = File::open(archive).map_err(|e| io(archive, e))?;
        let mut tarball = tar::Archive::new(file);

        std::fs::create_dir_all(dest).map_err(|e| io(dest, e))?;
        clear_members(dest)?;

        let mut carried = BTreeSet::new();
        let entries = tarball.entries().map_err(|e| io(archive, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| io(archive, e))?;
            let path = entry.path().map_err(|e| io(archive, e))?.into_owned();
            let name = path.display().to_string();

            if !entry.unpack_in(dest).map_err(|e| io(dest, e))? {
                return Err(Error::UnsafeMember(name));
            }

            if let Some(top) = top_level(&path) {
                carried.insert(top);
            }
        }

        let member = |name: &str| -> Result<PathBuf, Error> {
            let p = dest.join(name);
            if carried.contains(name) && p.is_file() {
                Ok(p)
            } else {
                Err(Error::MissingPackageMember(name.to_string()))
            }
        };

        let code_tar = member(CODE_TAR_NAME)?;
        let image_tar = member(IMAGE_TAR_NAME)?;
        let config_path = member(APP_CONFIG_NAME)?;
        let test_dir = Some(dest.join(TEST_DIR_NAME))
            .filter(|p| carried.contains(TEST_DIR_NAME) && p.is_dir());

        Ok(Self {
            code_tar,
            image_tar,
            config_path,
            test_dir,
        })
    }
}

/// First normal component of an entry path, `./` prefixes skipped
fn top_level(path: &Path) -> Option<String> {
    path.components().find_map(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    })
}

fn clear_members(dest: &Path) -> Result<(), Error> {
    for name in [CODE_TAR_NAME, IMAGE_TAR_NAME, APP_CONFIG_NAME, TEST_DIR_NAME] {
        let p = dest.join(name);
        let r = match p.symlink_metadata() {
            Ok(m) if m.is_dir() => std::fs::remove_dir_all(&p),
            Ok(_) => std::fs::remove_file(&p),
            Err(_) => continue,
        };
        r.map_err(|e| io(&p, e))?;
        debug!("removed stale {}", p.display());
    }
    Ok(())
}

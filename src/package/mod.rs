// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Application packages: a tar archive bundling the encrypted code archive,
//! the saved container image, the application configuration and an
//! optional test directory.

pub use self::appconfig::AppConfig;
pub use self::codepackage::{archive_code, CodePackage};
pub use self::codepackage::{APP_CONFIG_NAME, CODE_TAR_NAME, IMAGE_TAR_NAME, TEST_DIR_NAME};
pub use self::errors::Error;

mod appconfig;
mod codepackage;
mod errors;

// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Deployment of packaged web applications into SGX enclaves.
//!
//! This crate provides an API to package an application, run it inside an
//! enclave container, attest the running enclave through its RA-TLS
//! certificate and provision the application secrets once the enclave has
//! been verified.
//!
//! The API allows:
//! * Building and unpacking the code package shipped to the operator
//! * Encoding the launch configuration into container arguments, and
//!   recovering it from a running container
//! * Spawning, observing, stopping and testing enclave instances
//! * Collecting and verifying attestation evidence against a recomputed
//!   enclave fingerprint
//! * Sending secrets to an instance waiting for them

pub mod base64;
pub mod evidence;
pub mod instance;
pub mod launch;
pub mod logging;
pub mod package;
pub mod poll;
pub mod runtime;
pub mod secrets;

// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

#![forbid(unsafe_code)]

#[cfg(test)]
pub mod common;

#[cfg(test)]
mod test_process;
#[cfg(test)]
mod test_trust;

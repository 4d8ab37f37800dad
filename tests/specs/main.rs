// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end specs for the `bbr` binary.
//!
//! Every spec builds deployments out of local-transport instances in a temp
//! directory, with real shell scripts as job hooks.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod prelude;

mod cli {
    mod errors;
    mod help;
}

mod backup {
    mod failures;
    mod locking;
    mod manifest;
    mod single_instance;
}

mod restore {
    mod round_trip;
    mod validation;
}

mod check {
    mod pre_backup;
}

mod cleanup {
    mod leftovers;
}

mod deployments {
    mod all;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflows driving a discovered deployment.

mod backup;
mod check;
mod cleanup;
mod fsm;
mod restore;

pub use backup::{
    backup, BackupEvent, BackupMachine, BackupOptions, BackupOutcome, BackupState, BackupWorkflow,
};
pub use check::pre_backup_check;
pub use cleanup::cleanup_previous;
pub use fsm::{Fsm, Machine};
pub use restore::{
    restore, RestoreEvent, RestoreMachine, RestoreOutcome, RestoreState, RestoreWorkflow,
};

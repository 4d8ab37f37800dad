// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bbr ... pre-backup-check`

use bbr_engine::{pre_backup_check, Deployment};

pub async fn run(deployment: &mut Deployment) -> i32 {
    let errors = pre_backup_check(deployment).await;
    if errors.is_fatal() {
        println!("Deployment '{}' cannot be backed up.", deployment.name());
    } else {
        println!("Deployment '{}' can be backed up.", deployment.name());
    }
    super::report(deployment, &errors, None)
}

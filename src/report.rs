//! Filter-and-print pass over the protection-group listing.
//!
//! A group is reported when its last run has a local backup whose status is
//! exactly [`SUCCEEDED_WITH_WARNING`]. The comparison is case-sensitive.
//! Output order follows the listing; nothing is sorted.

use std::io::Write;

use crate::protection_groups::{BackupInfo, ProtectionGroup};

/// Run status for a backup that completed but emitted warnings.
pub const SUCCEEDED_WITH_WARNING: &str = "SucceededWithWarning";

/// Returns the group's local backup info if its last run succeeded with
/// warnings, `None` otherwise (including when it has no run or no local
/// backup).
pub fn warning_info(group: &ProtectionGroup) -> Option<&BackupInfo> {
    group
        .last_run
        .as_ref()?
        .local_backup_info
        .as_ref()
        .filter(|info| info.status == SUCCEEDED_WITH_WARNING)
}

/// Groups whose last run succeeded with warnings, in listing order.
pub fn groups_with_warnings(
    groups: &[ProtectionGroup],
) -> impl Iterator<Item = (&ProtectionGroup, &BackupInfo)> {
    groups
        .iter()
        .filter_map(|group| warning_info(group).map(|info| (group, info)))
}

/// Writes one block per matching group and returns how many were written.
///
/// ```text
/// Protection Group ID: <id>, Name: <name>
///   Message: <message>
/// ```
pub fn write_report<W: Write>(
    groups: &[ProtectionGroup],
    out: &mut W,
) -> std::io::Result<usize> {
    let mut reported = 0;
    for (group, info) in groups_with_warnings(groups) {
        writeln!(out, "Protection Group ID: {}, Name: {}", group.id, group.name)?;
        for message in &info.messages {
            writeln!(out, "  Message: {message}")?;
        }
        reported += 1;
    }
    Ok(reported)
}

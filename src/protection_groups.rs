//! Protection-group listing for the cluster's v2 data-protect API.
//!
//! - [`list_protection_groups`] — fetch every live protection group together
//!   with its most recent run.
//!
//! The response types mirror the JSON the cluster sends. The cluster omits
//! or nulls fields depending on group type and run state, so every field
//! falls back to its default instead of failing the whole payload. A group
//! that has never run has no `lastRun`; a run without a local copy (for
//! example a pure replication run) has no `localBackupInfo`.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::auth::AccessToken;
use crate::client::ClusterClient;
use crate::error::Result;

/// Path of the protection-group listing, relative to the cluster base URL.
pub const PROTECTION_GROUPS_PATH: &str = "v2/data-protect/protection-groups";

/// Fixed query flags for the listing: fresh data, pruned source ids,
/// non-deleted groups only, tenants and last-run info included.
pub const PROTECTION_GROUPS_QUERY: [(&str, &str); 6] = [
    ("useCachedData", "false"),
    ("pruneSourceIds", "true"),
    ("pruneExcludedSourceIds", "true"),
    ("isDeleted", "false"),
    ("includeTenants", "true"),
    ("includeLastRunInfo", "true"),
];

/// Treats an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Response types ─────────────────────────────────────────────────────

/// Envelope of the listing response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtectionGroupsResponse {
    /// The groups, in the order the cluster returned them.
    #[serde(deserialize_with = "nullable")]
    pub protection_groups: Vec<ProtectionGroup>,
}

/// A configured set of sources backed up together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtectionGroup {
    /// Cluster-wide group identifier, e.g. `"4921:1623:12"`.
    #[serde(deserialize_with = "nullable")]
    pub id: String,

    /// Display name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,

    /// Most recent run. Absent until the group has run once.
    pub last_run: Option<Run>,
}

/// One execution of a protection group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Run {
    /// Run identifier.
    #[serde(deserialize_with = "nullable")]
    pub id: String,

    /// Instance number of the run within its group; increases by one per run.
    #[serde(deserialize_with = "nullable")]
    pub protection_group_instance_id: i64,

    /// `true` when the run copied a snapshot in from another cluster
    /// instead of backing up sources.
    #[serde(deserialize_with = "nullable")]
    pub is_replication_run: bool,

    /// Outcome of the locally stored copy. Absent for runs with no local
    /// backup.
    pub local_backup_info: Option<BackupInfo>,
}

/// Outcome of a run's local backup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupInfo {
    /// `kRegular`, `kFull`, `kLog`, `kSystem`, ...
    #[serde(deserialize_with = "nullable")]
    pub run_type: String,

    /// Whether the run overran the group's SLA window.
    #[serde(deserialize_with = "nullable")]
    pub is_sla_violated: bool,

    /// Microseconds since the Unix epoch.
    #[serde(deserialize_with = "nullable")]
    pub start_time_usecs: i64,

    /// Microseconds since the Unix epoch. Zero while the run is in progress.
    #[serde(deserialize_with = "nullable")]
    pub end_time_usecs: i64,

    /// `Succeeded`, `SucceededWithWarning`, `Failed`, `Running`, ...
    #[serde(deserialize_with = "nullable")]
    pub status: String,

    /// Warning or failure messages attached to the run.
    #[serde(deserialize_with = "nullable")]
    pub messages: Vec<String>,

    /// Source objects (VMs, volumes, physical hosts, ...) backed up successfully.
    #[serde(deserialize_with = "nullable")]
    pub successful_objects_count: i64,
    /// Source objects whose backup failed.
    #[serde(deserialize_with = "nullable")]
    pub failed_objects_count: i64,
    /// Source objects whose backup was cancelled.
    #[serde(deserialize_with = "nullable")]
    pub cancelled_objects_count: i64,
    /// Source objects skipped by the run.
    #[serde(deserialize_with = "nullable")]
    pub skipped_objects_count: i64,
    /// Application objects (databases, mailboxes) backed up successfully.
    #[serde(deserialize_with = "nullable")]
    pub successful_app_objects_count: i64,
    /// Application objects whose backup failed.
    #[serde(deserialize_with = "nullable")]
    pub failed_app_objects_count: i64,
    /// Application objects whose backup was cancelled.
    #[serde(deserialize_with = "nullable")]
    pub cancelled_app_objects_count: i64,

    /// Byte counters for the local snapshot. Zeroed when the cluster
    /// omits them.
    #[serde(deserialize_with = "nullable")]
    pub local_snapshot_stats: SnapshotStats,

    /// Id of the indexing task spawned for the run, if any.
    #[serde(deserialize_with = "nullable")]
    pub indexing_task_id: String,
    /// Id of the cluster task that performed the local backup.
    #[serde(deserialize_with = "nullable")]
    pub local_task_id: String,
}

impl BackupInfo {
    /// Wall-clock duration of the run, or `None` if it has not finished or
    /// the timestamps are inconsistent.
    pub fn duration(&self) -> Option<Duration> {
        if self.end_time_usecs <= 0 {
            return None;
        }
        let micros = self.end_time_usecs.checked_sub(self.start_time_usecs)?;
        u64::try_from(micros).ok().map(Duration::from_micros)
    }
}

/// Byte counters for a run's local snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotStats {
    /// Logical size of the protected data.
    #[serde(deserialize_with = "nullable")]
    pub logical_size_bytes: i64,
    /// Bytes written to the cluster after dedup and compression.
    #[serde(deserialize_with = "nullable")]
    pub bytes_written: i64,
    /// Bytes read from the source.
    #[serde(deserialize_with = "nullable")]
    pub bytes_read: i64,
}

// ── API functions ──────────────────────────────────────────────────────

/// Lists the cluster's non-deleted protection groups with last-run info.
///
/// The listing is requested uncached and in one page.
///
/// # Errors
///
/// - [`crate::error::Error::Api`] if the cluster rejects the token or the query.
/// - [`crate::error::Error::Parse`] if the body is not a listing.
/// - [`crate::error::Error::Network`] on transport failure.
pub async fn list_protection_groups(
    client: &ClusterClient,
    token: &AccessToken,
) -> Result<Vec<ProtectionGroup>> {
    let response: ProtectionGroupsResponse = client
        .get_json(
            PROTECTION_GROUPS_PATH,
            &PROTECTION_GROUPS_QUERY,
            token.bearer(),
        )
        .await?;
    info!(
        count = response.protection_groups.len(),
        "protection groups retrieved"
    );
    Ok(response.protection_groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_group_deserializes_from_cluster_format() {
        let json = r#"{
            "id": "4921:1623:12",
            "name": "SQL Nightly",
            "lastRun": {
                "id": "4921:1623:12:889",
                "protectionGroupInstanceId": 889,
                "isReplicationRun": false,
                "localBackupInfo": {
                    "runType": "kIncremental",
                    "isSlaViolated": true,
                    "startTimeUsecs": 1700000000000000,
                    "endTimeUsecs": 1700000090000000,
                    "status": "SucceededWithWarning",
                    "messages": ["VSS snapshot slow", "1 file skipped"],
                    "successfulObjectsCount": 3,
                    "failedObjectsCount": 0,
                    "cancelledObjectsCount": 0,
                    "skippedObjectsCount": 1,
                    "successfulAppObjectsCount": 2,
                    "failedAppObjectsCount": 0,
                    "cancelledAppObjectsCount": 0,
                    "localSnapshotStats": {
                        "logicalSizeBytes": 1048576,
                        "bytesWritten": 4096,
                        "bytesRead": 8192
                    },
                    "indexingTaskId": "idx-1",
                    "localTaskId": "task-1"
                }
            }
        }"#;
        let group: ProtectionGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.id, "4921:1623:12");
        assert_eq!(group.name, "SQL Nightly");

        let run = group.last_run.unwrap();
        assert_eq!(run.protection_group_instance_id, 889);
        assert!(!run.is_replication_run);

        let info = run.local_backup_info.unwrap();
        assert_eq!(info.run_type, "kIncremental");
        assert!(info.is_sla_violated);
        assert_eq!(info.status, "SucceededWithWarning");
        assert_eq!(info.messages, vec!["VSS snapshot slow", "1 file skipped"]);
        assert_eq!(info.skipped_objects_count, 1);
        assert_eq!(info.successful_app_objects_count, 2);
        assert_eq!(info.local_snapshot_stats.logical_size_bytes, 1_048_576);
        assert_eq!(info.local_snapshot_stats.bytes_read, 8192);
        assert_eq!(info.local_task_id, "task-1");
        assert_eq!(info.duration(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn group_without_last_run_deserializes() {
        let group: ProtectionGroup =
            serde_json::from_str(r#"{"id":"1","name":"New group"}"#).unwrap();
        assert!(group.last_run.is_none());
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let json = r#"{
            "id": "7",
            "name": null,
            "lastRun": {
                "id": null,
                "localBackupInfo": {
                    "status": "Succeeded",
                    "messages": null,
                    "localSnapshotStats": null,
                    "endTimeUsecs": null
                }
            }
        }"#;
        let group: ProtectionGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.name, "");
        let info = group.last_run.unwrap().local_backup_info.unwrap();
        assert!(info.messages.is_empty());
        assert_eq!(info.local_snapshot_stats.bytes_written, 0);
        assert_eq!(info.duration(), None, "unfinished run has no duration");
    }

    #[test]
    fn null_local_backup_info_is_none() {
        let group: ProtectionGroup = serde_json::from_str(
            r#"{"id":"3","name":"Replica","lastRun":{"isReplicationRun":true,"localBackupInfo":null}}"#,
        )
        .unwrap();
        let run = group.last_run.unwrap();
        assert!(run.is_replication_run);
        assert!(run.local_backup_info.is_none());
    }

    #[test]
    fn response_envelope_preserves_order_and_ignores_unknown_fields() {
        let json = r#"{
            "protectionGroups": [
                {"id": "b", "name": "Second", "environment": "kVMware"},
                {"id": "a", "name": "First"}
            ],
            "paginationCookie": null
        }"#;
        let response: ProtectionGroupsResponse = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = response
            .protection_groups
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn empty_listing_has_no_groups() {
        let response: ProtectionGroupsResponse =
            serde_json::from_str(r#"{"protectionGroups":null}"#).unwrap();
        assert!(response.protection_groups.is_empty());
    }

    #[test]
    fn duration_rejects_end_before_start() {
        let info = BackupInfo {
            start_time_usecs: 2_000_000,
            end_time_usecs: 1_000_000,
            ..Default::default()
        };
        assert_eq!(info.duration(), None);
    }
}

//! Template configuration written when none exists.

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Template contents. Every required key holds the placeholder value, so the
/// template fails validation until an operator fills it in.
pub const TEMPLATE: &str = r#"# clusterup configuration
#
# Replace every "<set-me>" value before running `clusterup run`.

environment:
  name: "<set-me>"
  location: "<set-me>"
  subscription: ""

resources:
  resource_group: "<set-me>"

cluster:
  name: "<set-me>"
  node_count: 3

# One toggle per optional pipeline step. Absent toggles are disabled.
features:
  security: true
  monitoring: true
  sample_app: true

prerequisites:
  tools: [az, kubectl, helm]
  session_check: [az, account, show]

session:
  env: {}

settings:
  reports_dir: reports
  # step_timeout_secs: 1800

# The built-in pipeline runs, in order:
#   cluster     scripts/create-cluster.sh
#   security    scripts/apply-security.sh     (features.security)
#   monitoring  scripts/install-monitoring.sh (features.monitoring)
#   sample-app  scripts/deploy-sample-app.sh  (features.sample_app)
#
# Declare `pipeline:` to replace it:
# pipeline:
#   - name: cluster
#     run: scripts/create-cluster.sh
#     interpreter: bash
#     requires: [cluster.name]
#     params:
#       ClusterName: "${cluster.name}"
"#;

/// Write the template to `path`, creating parent directories.
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, TEMPLATE)?;
    Ok(())
}

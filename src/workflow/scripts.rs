//! Shell scripts run by the generated workflow steps
//!
//! The scripts are fixed text. Every value that varies between runs reaches
//! them through the step's `env:` block.

/// Copies every visible repository secret to `$TARGET_REPO`.
///
/// Each value is piped through stdin unchanged. A failed write is recorded and
/// the loop moves on; the step fails once every secret has been attempted.
pub const BULK_REPO_SECRETS: &str = r#"set -uo pipefail
migrated=0
failed=0
while IFS= read -r name; do
  case " $RESERVED_SECRETS " in
    *" $name "*) continue ;;
  esac
  if printf '%s' "$SECRETS_CONTEXT" | jq -j --arg name "$name" '.[$name]' \
    | gh secret set "$name" --repo "$TARGET_REPO"; then
    echo "Migrated $name"
    migrated=$((migrated + 1))
  else
    echo "::error title=Secret migration failed::Could not write $name to $TARGET_REPO"
    failed=$((failed + 1))
  fi
done < <(printf '%s' "$SECRETS_CONTEXT" | jq -r 'keys[]')
echo "Migrated $migrated secret(s) to $TARGET_REPO, $failed failed"
if [ "$failed" -gt 0 ]; then
  exit 1
fi
"#;

/// Copies one organization secret to `$TARGET_ORG`.
pub const ORG_SECRET: &str = r#"set -euo pipefail
printf '%s' "$SECRET_VALUE" | gh secret set "$SECRET_NAME" --org "$TARGET_ORG" --visibility all
echo "Migrated $SECRET_NAME to $TARGET_ORG"
"#;

/// Copies one environment secret to the same environment of `$TARGET_REPO`.
pub const ENVIRONMENT_SECRET: &str = r#"set -euo pipefail
printf '%s' "$SECRET_VALUE" | gh secret set "$SECRET_NAME" --env "$ENVIRONMENT_NAME" --repo "$TARGET_REPO"
echo "Migrated $SECRET_NAME to environment $ENVIRONMENT_NAME of $TARGET_REPO"
"#;

/// Deletes the temporary credentials, then the migration branch.
///
/// A credential that cannot be deleted is reported as an error annotation and
/// in the step summary, and fails the job. A missing branch is not an error.
pub const CLEANUP: &str = r#"set -uo pipefail
cleanup_failed=0
for name in $TEMPORARY_SECRETS; do
  if gh secret delete "$name" --repo "$GITHUB_REPOSITORY"; then
    echo "Deleted temporary secret $name"
  else
    echo "::error title=MANUAL ACTION REQUIRED::Could not delete temporary secret $name from $GITHUB_REPOSITORY. Delete it manually now."
    echo "- **MANUAL ACTION REQUIRED**: delete secret \`$name\` from \`$GITHUB_REPOSITORY\`" >> "$GITHUB_STEP_SUMMARY"
    cleanup_failed=1
  fi
done
if gh api --method DELETE "repos/$GITHUB_REPOSITORY/git/refs/heads/$MIGRATION_BRANCH" > /dev/null 2>&1; then
  echo "Deleted branch $MIGRATION_BRANCH"
else
  echo "Branch $MIGRATION_BRANCH already deleted or missing"
fi
if [ "$cleanup_failed" -ne 0 ]; then
  echo "::error::Cleanup incomplete: temporary credentials remain in $GITHUB_REPOSITORY"
  exit 1
fi
echo "Cleanup complete"
"#;

//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::inventory::MigrationInventory;

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No secrets.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// One migrated secret and where it lives
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct SecretRow {
    #[tabled(rename = "SECRET")]
    pub name: String,
    #[tabled(rename = "SCOPE")]
    pub scope: String,
}

/// Rows for every secret in `inventory`, top-level secrets first.
pub fn secret_rows(inventory: &MigrationInventory) -> Vec<SecretRow> {
    let top_level = match inventory {
        MigrationInventory::Repository { .. } => "repository",
        MigrationInventory::Organization { .. } => "organization",
    };

    let mut rows: Vec<SecretRow> = inventory
        .secrets()
        .iter()
        .map(|name| SecretRow {
            name: name.to_string(),
            scope: top_level.to_string(),
        })
        .collect();

    for environment in inventory.environments().into_iter().flat_map(|envs| envs.iter()) {
        rows.extend(environment.secrets.iter().map(|name| SecretRow {
            name: name.to_string(),
            scope: format!("environment: {}", environment.name),
        }));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{EnvironmentInventory, migratable};

    #[test]
    fn test_format_table_empty() {
        let rows: Vec<SecretRow> = vec![];
        assert_eq!(format_table(&rows), "No secrets.");
    }

    #[test]
    fn test_format_table_uses_rounded_style() {
        let rows = vec![SecretRow {
            name: "API_TOKEN".to_string(),
            scope: "repository".to_string(),
        }];

        let result = format_table(&rows);

        assert!(result.contains("SECRET"));
        assert!(result.contains("SCOPE"));
        assert!(result.contains("API_TOKEN"));
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }

    #[test]
    fn test_secret_rows_repository() {
        let inventory = MigrationInventory::Repository {
            secrets: migratable(["API_TOKEN", "DB_URL"]),
            environments: EnvironmentInventory::new()
                .with("production", ["DEPLOY_KEY"])
                .with("staging", Vec::<&str>::new()),
        };

        let rows = secret_rows(&inventory);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].scope, "repository");
        assert_eq!(rows[2].name, "DEPLOY_KEY");
        assert_eq!(rows[2].scope, "environment: production");
    }

    #[test]
    fn test_secret_rows_organization() {
        let inventory = MigrationInventory::Organization {
            secrets: migratable(["NPM_TOKEN"]),
        };

        let rows = secret_rows(&inventory);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].scope, "organization");
    }
}

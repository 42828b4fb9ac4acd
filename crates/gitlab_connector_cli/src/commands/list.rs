//! Listing commands: resources, entitlements, and grants.

use gitlab_connector::connector::{Connector, ResourceSyncer};
use gitlab_connector::{Entitlement, Grant, Resource, ResourceId, ResourceKind};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// One resource line of `gitlab-connector resources`.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct ResourceRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Display Name")]
    pub display_name: String,
    #[tabled(rename = "Parent")]
    pub parent: String,
}

impl From<&Resource> for ResourceRow {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            display_name: resource.display_name.clone(),
            parent: resource
                .parent
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// One entitlement line of `gitlab-connector entitlements`.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct EntitlementRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Display Name")]
    pub display_name: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl From<&Entitlement> for EntitlementRow {
    fn from(entitlement: &Entitlement) -> Self {
        Self {
            id: entitlement.id.clone(),
            display_name: entitlement.display_name.clone(),
            description: entitlement.description.clone(),
        }
    }
}

/// One grant line of `gitlab-connector grants`.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct GrantRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Level")]
    pub level: String,
    #[tabled(rename = "Principal")]
    pub principal: String,
}

impl From<&Grant> for GrantRow {
    fn from(grant: &Grant) -> Self {
        Self {
            id: grant.id.clone(),
            level: grant.entitlement.level.to_string(),
            principal: grant.principal.to_string(),
        }
    }
}

fn print_rows<R>(rows: Vec<R>, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>>
where
    R: tabled::Tabled + serde::Serialize,
{
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("(no results)");
            } else {
                let mut table = tabled::Table::new(rows);
                table.with(tabled::settings::Style::rounded());
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

fn print_cursor(cursor: &str) {
    if !cursor.is_empty() {
        println!("next cursor: {cursor}");
    }
}

/// List one page of resources of `kind`.
pub async fn handle_resources(
    connector: &Connector,
    kind: ResourceKind,
    parent: Option<&ResourceId>,
    cursor: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (resources, next) = connector.syncer(kind).list(parent, cursor).await?;
    print_rows(
        resources.iter().map(ResourceRow::from).collect(),
        format,
    )?;
    print_cursor(&next);
    Ok(())
}

/// Enumerate the entitlements a resource offers.
pub async fn handle_entitlements(
    connector: &Connector,
    resource: &Resource,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let entitlements = connector
        .syncer(resource.id.kind)
        .entitlements(resource)
        .await?;
    print_rows(
        entitlements.iter().map(EntitlementRow::from).collect(),
        format,
    )
}

/// List one page of the grants currently held against a resource.
pub async fn handle_grants(
    connector: &Connector,
    resource: &Resource,
    cursor: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (grants, next) = connector
        .syncer(resource.id.kind)
        .grants(resource, cursor)
        .await?;
    print_rows(grants.iter().map(GrantRow::from).collect(), format)?;
    print_cursor(&next);
    Ok(())
}

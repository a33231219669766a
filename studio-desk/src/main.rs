use std::sync::Arc;

use studio_desk::{AnnotationDesk, setup_environment};

/// Integrity audit: load the roster and verify every annotation record
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env, logging) and configuration
    let config = setup_environment();
    tracing::info!(
        spreadsheet = %config.spreadsheet_id,
        enhanced_sheet = %config.sheets.enhanced,
        "Studio desk audit starting"
    );

    // 2. Sheet store
    let store = config.client_config()?.build_row_store()?;
    let desk = AnnotationDesk::from_config(&config, Arc::new(store));

    // 3. Roster with annotations
    let loaded = desk.load().await?;

    // 4. Checksums
    let report = desk.verify_all().await?;
    for member_id in &report.corrupted {
        let fallback = loaded
            .corrupted
            .contains(member_id)
            .then(|| desk.annotation(member_id))
            .flatten()
            .is_some_and(|a| a.version.is_none() && !a.fields.is_empty());
        tracing::warn!(
            member_id = %member_id,
            plain_fallback = fallback,
            "Annotation record failed verification"
        );
    }

    tracing::info!(
        members = loaded.members,
        versioned = loaded.versioned,
        plain = loaded.plain,
        checked = report.checked,
        valid = report.valid,
        corrupted = report.corrupted.len(),
        "Audit complete"
    );
    Ok(())
}

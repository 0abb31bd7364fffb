use nu_ansi_term::Color::{Blue, Cyan, Green, Magenta, Yellow};
use pkgdex_operations::{search, PkgdexContext};
use pkgdex_registry::PackageRecord;
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    utils::Colored,
};

pub async fn search_packages(
    ctx: &PkgdexContext,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> CliResult<()> {
    let limit = limit.unwrap_or_else(|| ctx.config().search_limit());
    debug!(query, limit, "searching packages");

    let result = search::search(ctx, query, Some(limit)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.packages)?);
        return Ok(());
    }

    for package in &result.packages {
        info!("{}", summary_line(package));
    }

    if result.total_count == 0 {
        info!("No packages found matching '{query}'");
    } else {
        info!(
            "Found {} (showing {})",
            Colored(Cyan, result.total_count),
            Colored(Green, result.packages.len())
        );
    }

    Ok(())
}

fn summary_line(package: &PackageRecord) -> String {
    let keywords = package.keywords();
    let keywords = if keywords.is_empty() {
        String::new()
    } else {
        format!(" [{}]", Colored(Magenta, keywords.join(", ")))
    };

    format!(
        "{} | {}{} - {}",
        Colored(Blue, &package.name),
        Colored(Green, &package.repo.name),
        keywords,
        package.description().unwrap_or_default()
    )
}

pub async fn package_info(ctx: &PkgdexContext, name: &str, json: bool) -> CliResult<()> {
    let package = search::find_by_name(ctx, name)
        .await?
        .ok_or_else(|| CliError::PackageNotFound(name.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&package)?);
        return Ok(());
    }

    for line in detail_lines(&package) {
        info!("{line}");
    }

    Ok(())
}

fn detail_lines(package: &PackageRecord) -> Vec<String> {
    let field = |label: &str, value: String| format!("{}: {}", Colored(Cyan, label), value);

    let mut lines = vec![
        field("Name", Colored(Blue, &package.name).to_string()),
        field(
            "Repository",
            format!("{} ({})", package.repo.name, package.repo.location),
        ),
        field("Source", package.url.clone()),
    ];

    if let Some(description) = package.description() {
        lines.push(field("Description", description));
    }

    let keywords = package.keywords();
    if !keywords.is_empty() {
        lines.push(field("Keywords", keywords.join(", ")));
    }

    if let Some(homepage) = package.homepage() {
        lines.push(field("Homepage", homepage));
    }

    if let Some(icon) = &package.icon {
        lines.push(field("Icon", icon.clone()));
    }

    lines.push(Colored(Cyan, "Install with:").to_string());
    lines.extend(
        package
            .install_hints()
            .into_iter()
            .map(|hint| format!("  {}", Colored(Yellow, hint))),
    );

    if let Some(readme) = package.readme() {
        lines.push(String::new());
        lines.push(readme.trim_end().to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use pkgdex_registry::RepoInfo;

    use super::*;
    use crate::utils::set_color;

    fn record() -> PackageRecord {
        let mut record =
            PackageRecord::new("pkgA", RepoInfo::new("r1", "//h/m.json"), "github:o/pkgA");
        record.package_json =
            Some(r#"{"description":"A tool","keywords":["net","cli"]}"#.to_string());
        record.readme_md = Some("# pkgA\n".to_string());
        record
    }

    #[test]
    fn test_summary_and_details() {
        set_color(false);
        let package = record();

        assert_eq!(summary_line(&package), "pkgA | r1 [net, cli] - A tool");

        let lines = detail_lines(&package);
        assert!(lines.contains(&"Description: A tool".to_string()));
        assert!(lines.contains(&"Keywords: net, cli".to_string()));
        assert!(lines.contains(&"Homepage: https://github.com/o/pkgA".to_string()));
        assert!(lines.contains(&"  rew install @r1/pkgA".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("# pkgA"));
    }

    #[test]
    fn test_details_skip_missing_readme() {
        set_color(false);
        let mut package = record();
        package.readme_md = Some("404: Not Found".to_string());
        package.package_json = None;

        let lines = detail_lines(&package);
        assert!(!lines.iter().any(|line| line.starts_with("Description")));
        assert!(lines.last().is_some_and(|line| line.contains("github:o/pkgA")));
    }
}

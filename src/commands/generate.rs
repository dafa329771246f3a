use super::Site;
use crate::build::Builder;
use crate::logger::Logger;

pub fn run(site: &Site) -> Result<(), anyhow::Error> {
    let builder = Builder::new(site.config.clone(), site.base_path.clone(), Logger::global());
    let result = builder.build()?;

    println!(
        "Built site to {} ({} posts, {} pages, {} tags, {} files written, {} assets copied, {} skipped)",
        result.output_dir.display(),
        result.posts,
        result.pages,
        result.tags,
        result.files_written,
        result.assets_copied,
        result.assets_skipped
    );

    Ok(())
}

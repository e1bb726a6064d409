/// Configuration file names to look for in the working directory
pub const CONFIG_FILES: [&str; 4] = ["_toc.yml", "_toc.yaml", "_toc.toml", "_toc.json"];

/// Default `id` of the generated list
pub fn default_list_id() -> String {
    "list-toc-generated".to_string()
}

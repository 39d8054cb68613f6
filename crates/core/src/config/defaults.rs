//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_OWNER: &str = "francoisHUP";
pub(crate) const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub(crate) const DEFAULT_GITHUB_WEB_URL: &str = "https://github.com";
pub(crate) const DEFAULT_FALLBACK_BRANCH: &str = "main";
pub(crate) const DEFAULT_EMBEDDING_PROVIDER: &str = "api";
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub(crate) const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_CHAT_PROVIDER: &str = "api";
pub(crate) const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub(crate) const DEFAULT_PERSONA: &str = "Francois Huppe-Marcoux";

pub(crate) fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

pub(crate) fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

pub(crate) fn default_github_web_url() -> String {
    DEFAULT_GITHUB_WEB_URL.to_string()
}

pub(crate) fn default_request_delay_ms() -> u64 {
    1000
}

pub(crate) fn default_github_max_retries() -> u32 {
    5
}

pub(crate) fn default_initial_backoff_ms() -> u64 {
    30_000
}

pub(crate) fn default_fallback_branch() -> String {
    DEFAULT_FALLBACK_BRANCH.to_string()
}

pub(crate) fn default_dataset_dir() -> String {
    "dataset".to_string()
}

pub(crate) fn default_details_dir() -> String {
    "extracted-information".to_string()
}

pub(crate) fn default_output_file() -> String {
    "projects_tree_enhanced_with_positions.json".to_string()
}

pub(crate) fn default_rag_data_file() -> String {
    "rag_data.json".to_string()
}

pub(crate) fn default_embedding_provider() -> String {
    DEFAULT_EMBEDDING_PROVIDER.to_string()
}

pub(crate) fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

pub(crate) fn default_api_base_url() -> Option<String> {
    Some(DEFAULT_API_BASE_URL.to_string())
}

pub(crate) fn default_embedding_dimension() -> usize {
    1536
}

pub(crate) fn default_texts_per_api_request() -> usize {
    64
}

pub(crate) fn default_embedding_retry_attempts() -> usize {
    3
}

pub(crate) fn default_max_text_chars() -> usize {
    512
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn default_allowed_extensions() -> Vec<String> {
    to_strings(&[
        ".py", ".java", ".ipynb", ".js", ".ts", ".html", ".css", ".cpp", ".c", ".h", ".cs", ".rb",
        ".go", ".swift", ".tsx", ".sh", ".sql", ".vue", ".rst", ".toml", ".yaml", ".yml",
    ])
}

pub(crate) fn default_allowed_names() -> Vec<String> {
    to_strings(&["requirements.txt"])
}

pub(crate) fn default_denied_names() -> Vec<String> {
    to_strings(&["package-lock.json", ".gitignore", "todo"])
}

pub(crate) fn default_denied_extensions() -> Vec<String> {
    to_strings(&[
        ".bat",
        ".bib",
        ".db",
        ".dev",
        ".dockerignore",
        ".drawio",
        ".ds_store",
        ".eot",
        ".example",
        ".form",
        ".gitignore",
        ".json",
        ".lock",
        ".md",
        ".pcl",
        ".pth",
        ".puml",
        ".python-version",
        ".raml",
        ".rules",
        ".run",
        ".webp",
        ".woff",
        ".woff2",
        ".xml",
    ])
}

pub(crate) fn default_min_distance() -> f64 {
    1.0
}

pub(crate) fn default_max_distance() -> f64 {
    10.0
}

pub(crate) fn default_decay_factor() -> f64 {
    0.6
}

pub(crate) fn default_blend_alpha() -> f64 {
    0.45
}

pub(crate) fn default_size_scale() -> f64 {
    0.08
}

pub(crate) fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_server_port() -> u16 {
    8080
}

pub(crate) fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

pub(crate) fn default_top_k() -> usize {
    2
}

pub(crate) fn default_threshold() -> f32 {
    0.5
}

pub(crate) fn default_top_n_sentences() -> usize {
    3
}

pub(crate) fn default_max_content_length() -> usize {
    1000
}

pub(crate) fn default_chat_provider() -> String {
    DEFAULT_CHAT_PROVIDER.to_string()
}

pub(crate) fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

pub(crate) fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

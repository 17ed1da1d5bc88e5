pub fn get_hostname(preferred: Option<String>) -> String {
    preferred.unwrap_or_else(|| gethostname::gethostname().to_string_lossy().into_owned())
}

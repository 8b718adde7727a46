/// Extracts the product release a job targets from its name.
///
/// Job names follow the `DFG-<squad>-<component>-<release>-<topology>...`
/// convention, so the release is the first dash or underscore separated token
/// that is a dotted number (e.g. `16.2` in `DFG-compute-nova-16.2-3cont_2comp`).
///
/// # Returns
///
/// The release string, or `None` when the name carries no release token.
pub fn release_version(job_name: &str) -> Option<String> {
    job_name
        .split(['-', '_'])
        .find(|token| is_release_token(token))
        .map(str::to_string)
}

fn is_release_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

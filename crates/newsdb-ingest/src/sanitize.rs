use newsdb_core::NewsCandidate;

/// Character reserved as a delimiter by downstream consumers of stored URLs.
pub const RESERVED_DELIMITER: char = ';';

/// Strip [`RESERVED_DELIMITER`] from `link` and `image`. Other fields are left
/// alone. An image left empty by stripping becomes `None`.
#[must_use]
pub fn sanitize(mut candidate: NewsCandidate) -> NewsCandidate {
    candidate.link = strip_delimiter(&candidate.link);
    candidate.image = candidate
        .image
        .map(|image| strip_delimiter(&image))
        .filter(|image| !image.is_empty());
    candidate
}

fn strip_delimiter(value: &str) -> String {
    value.replace(RESERVED_DELIMITER, "")
}

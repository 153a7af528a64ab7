//! Part name arithmetic
//!
//! Part names are zip member names without a leading slash
//! (`xl/worksheets/sheet1.xml`). The package itself is the empty source
//! `""`, whose relationships live in `_rels/.rels`.

/// Directory of a part name (`xl/worksheets/sheet1.xml` -> `xl/worksheets`)
pub fn base_dir(part: &str) -> &str {
    part.rfind('/').map_or("", |pos| &part[..pos])
}

/// Name of the relationships part belonging to `source`
pub fn rels_part(source: &str) -> String {
    let dir = base_dir(source);
    let file = &source[source.rfind('/').map_or(0, |pos| pos + 1)..];
    if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    }
}

/// Resolve a relationship target against its source part
pub fn resolve(source: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let dir = base_dir(source);
            if dir.is_empty() {
                target.to_string()
            } else {
                format!("{}/{}", dir, target)
            }
        }
    };
    normalize(&joined)
}

/// Target of `part` written relative to `source`
pub fn relative(source: &str, part: &str) -> String {
    let from: Vec<&str> = base_dir(source).split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = part.split('/').filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = Vec::new();
    segments.extend(std::iter::repeat("..").take(from.len() - common));
    segments.extend(to.iter().skip(common).copied());
    segments.join("/")
}

fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

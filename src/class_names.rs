use crate::error::Error;
use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader},
    ops::Deref,
    path::Path,
};
use tracing::debug;

/// Ordered, unique keypoint names. Index `i` names keypoint `i` everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClassNames(Vec<String>);

impl ClassNames {
    pub(crate) fn new<I, S>(names: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();

        for name in names {
            let name: String = name.into();
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name.to_owned()) {
                return Err(Error::DuplicateClassName(name.to_owned()));
            }
            ordered.push(name.to_owned());
        }

        if ordered.is_empty() {
            return Err(Error::EmptyClassNames);
        }
        Ok(Self(ordered))
    }

    /// Load class names from a text file, one per line.
    pub(crate) fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::OpenClassNames(e, path.to_owned()))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::ReadClassNames(e, path.to_owned()))?;
        let names = Self::new(lines)?;
        debug!(message = "loaded class names", path = ?path, count = names.len());
        Ok(names)
    }
}

impl Deref for ClassNames {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::ClassNames;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn trims_and_skips_blank_lines() {
        let names = ClassNames::new(vec![" nose ", "", "left_eye\r", "  "]).unwrap();
        assert_eq!(&*names, &["nose".to_owned(), "left_eye".to_owned()]);
    }

    #[test]
    fn rejects_duplicates() {
        let err = ClassNames::new(vec!["nose", "left_eye", "nose"]).unwrap_err();
        assert!(matches!(err, Error::DuplicateClassName(name) if name == "nose"));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            ClassNames::new(Vec::<String>::new()),
            Err(Error::EmptyClassNames)
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "right_ankle\nright_knee\nright_hip").unwrap();
        let names = ClassNames::from_path(file.path()).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names[1], "right_knee");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClassNames::from_path(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, Error::OpenClassNames(..)));
    }

    #[test]
    fn bundled_lists_have_supported_lengths() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("configs");
        assert_eq!(ClassNames::from_path(root.join("mpii_classes.txt")).unwrap().len(), 16);
        assert_eq!(ClassNames::from_path(root.join("coco_classes.txt")).unwrap().len(), 17);
    }
}

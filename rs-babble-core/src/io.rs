use std::path::Path;
use std::{fs, io};

/// Reads a text file into a single `String`.
///
/// The raw contents are returned as-is; paragraph structure (blank lines)
/// is preserved for the tokenizer.
pub fn read_text<P: AsRef<Path>>(path: P) -> io::Result<String> {
	fs::read_to_string(path)
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted for stable output.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files: Vec<String> = fs::read_dir(dir)?
		.filter_map(|entry| entry.ok())
		.map(|entry| entry.path())
		.filter(|path| {
			path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension))
		})
		.filter_map(|path| path.file_name().map(|name| name.to_string_lossy().to_string()))
		.collect();

	files.sort();
	Ok(files)
}

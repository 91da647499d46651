// this module contain file management functions

/// return a reference to the file name
pub fn get_file_name(file_path: &str) -> &str {
    let path: Vec<&str> = file_path.split('/').collect();
    path.last().expect("failed to fetch file name")
}

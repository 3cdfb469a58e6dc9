// struct to handle file buffers


use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use log::debug;

pub struct FileBufferHelper {
    pub path: PathBuf,
    pub buffer_reader: BufReader<File>,
    pub line: Vec<u8>,
    pub line_number: usize,
}

impl FileBufferHelper {
    pub fn new(file: &Path) -> io::Result<FileBufferHelper> {
        // initialise instance of FileBufferHelper
        let file_open = File::open(file)?;
        debug!("FileHelper created for: {:?}", file);
        Ok(Self {
            path: file.to_path_buf(),
            buffer_reader: BufReader::new(file_open),
            line: Vec::new(),
            line_number: 0,
        })
    }

    // raw bytes, symbol checks happen per sequence
    // false once the end of the file is reached
    pub fn next_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        let read = self.buffer_reader.read_until(b'\n', &mut self.line)?;
        if read == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }
}

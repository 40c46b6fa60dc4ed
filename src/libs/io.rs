use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Opens `input` for reading; `stdin` reads standard input and a `.gz`
/// extension is decompressed transparently.
///
/// ```
/// use std::io::Write;
/// use std::io::BufRead;
/// let mut file = tempfile::NamedTempFile::new().unwrap();
/// writeln!(file, "((A,B)X,C)root;").unwrap();
///
/// let reader = ogsel::reader(file.path().to_str().unwrap());
/// assert_eq!(reader.lines().count(), 1);
/// ```
pub fn reader(input: &str) -> Box<dyn BufRead> {
    match open_reader(input) {
        Ok(reader) => reader,
        Err(why) => panic!("could not open {}: {}", input, why),
    }
}

/// Fallible variant of [`reader`].
pub fn open_reader(input: &str) -> std::io::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = Path::new(input);
        let file = std::fs::File::open(path)?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

pub fn writer(output: &str) -> Box<dyn Write> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        Box::new(BufWriter::new(std::fs::File::create(output).unwrap()))
    };

    writer
}

/// Reads a two-column `name<TAB>value` file, skipping blank lines and `#` comments.
pub fn read_pairs(input: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut pairs = vec![];
    for line in open_reader(input)?.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 {
            anyhow::bail!("Expected two tab-separated columns: {}", line);
        }
        pairs.push((fields[0].to_string(), fields[1].to_string()));
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_reader_missing() {
        assert!(open_reader("tests/no/such/file.fa").is_err());
    }

    #[test]
    fn test_read_pairs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# name\tpath").unwrap();
        writeln!(file, "A\ta.fa").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "B\tb.fa.gz").unwrap();

        let pairs = read_pairs(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "a.fa".to_string()),
                ("B".to_string(), "b.fa.gz".to_string())
            ]
        );
    }
}

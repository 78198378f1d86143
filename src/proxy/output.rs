//! Output artifact: the consolidated proxy list file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::proxy::error::RunError;
use crate::proxy::models::Proxy;

/// Write one canonical `scheme://host:port` line per proxy, replacing any
/// previous file
pub fn write_proxies<'a, I>(path: &Path, proxies: I) -> Result<(), RunError>
where
    I: IntoIterator<Item = &'a Proxy>,
{
    let file = File::create(path).map_err(|err| RunError::io(path, err))?;
    let mut writer = BufWriter::new(file);

    for proxy in proxies {
        writeln!(writer, "{}", proxy).map_err(|err| RunError::io(path, err))?;
    }

    writer.flush().map_err(|err| RunError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::models::ProxyType;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("harvest-out-{}-{}.txt", tag, std::process::id()))
    }

    #[test]
    fn test_writes_one_line_per_proxy() {
        let path = temp_path("lines");
        let proxies = vec![
            Proxy::new("192.0.2.1".to_string(), 8080, ProxyType::Http),
            Proxy::new("192.0.2.2".to_string(), 1080, ProxyType::Socks5),
        ];

        write_proxies(&path, &proxies).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["http://192.0.2.1:8080", "socks5://192.0.2.2:1080"]);
    }

    #[test]
    fn test_overwrites_previous_run() {
        let path = temp_path("overwrite");
        let first = vec![
            Proxy::new("192.0.2.1".to_string(), 80, ProxyType::Http),
            Proxy::new("192.0.2.2".to_string(), 80, ProxyType::Http),
        ];
        let second = vec![Proxy::new("192.0.2.3".to_string(), 80, ProxyType::Http)];

        write_proxies(&path, &first).unwrap();
        write_proxies(&path, &second).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(content, "http://192.0.2.3:80\n");
    }
}

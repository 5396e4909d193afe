//! Shell command snippets for common RUN steps.

const PIP_FLAGS: &str = "--disable-pip-version-check --no-cache-dir";
const CONTINUATION: &str = " \\\n    ";

/// Install Python packages from pypi.org.
pub fn pip_install<I, S>(pkgs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pkgs: Vec<String> = pkgs.into_iter().map(|p| p.as_ref().to_string()).collect();
    format!("python3 -m pip {} install {}", PIP_FLAGS, pkgs.join(" "))
}

/// Install system packages from Debian repositories.
///
/// More than two packages are sorted and put one per continuation line.
pub fn apt_install<I, S>(pkgs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pkgs: Vec<String> = pkgs.into_iter().map(|p| p.as_ref().to_string()).collect();
    let suffix = if pkgs.len() <= 2 {
        pkgs.join(" ")
    } else {
        pkgs.sort();
        format!("{}{}", CONTINUATION, pkgs.join(CONTINUATION))
    };
    format!("apt-get update && apt-get install -y --no-install-recommends {}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pip_install() {
        assert_eq!(
            pip_install(["httpie==3.2.1"]),
            "python3 -m pip --disable-pip-version-check --no-cache-dir install httpie==3.2.1"
        );
    }

    #[test]
    fn test_apt_install_short() {
        assert_eq!(
            apt_install(["curl", "git"]),
            "apt-get update && apt-get install -y --no-install-recommends curl git"
        );
    }

    #[test]
    fn test_apt_install_long() {
        assert_eq!(
            apt_install(["vim", "curl", "git"]),
            "apt-get update && apt-get install -y --no-install-recommends \\\n    \
             curl \\\n    git \\\n    vim"
        );
    }
}

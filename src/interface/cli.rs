use std::ffi::OsString;
use std::path::PathBuf;

use clap::{App, ArgMatches, Error, ErrorKind};

use crate::graphics::window::WindowHints;

/// Everything the command line decides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub hints: WindowHints,
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    /// How many times `-v` was given
    pub verbosity: u64,
}

/// Parses `args` (program name first). `--help` and `--version` come back as errors too, and
/// `Error::exit` prints them and exits the right way.
pub fn parse<I, T>(args: I) -> Result<Config, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let yaml = load_yaml!("cli.yaml");
    let matches = App::from_yaml(yaml).get_matches_from_safe(args)?;

    Config::from_matches(&matches)
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, Error> {
        let width = value_t!(matches, "width", u32)?;
        let height = value_t!(matches, "height", u32)?;

        if width == 0 || height == 0 {
            return Err(Error::with_description(
                &format!("The window must be at least 1x1, got {}x{}", width, height),
                ErrorKind::InvalidValue,
            ));
        }

        let gl_version = parse_gl_version(matches.value_of("gl-version").unwrap_or("3.3"))?;

        Ok(Config {
            width,
            height,
            title: matches.value_of("title").unwrap_or("glquad").to_string(),
            hints: WindowHints {
                resizable: !matches.is_present("fixed-size"),
                vsync: !matches.is_present("no-vsync"),
                gl_version,
            },
            vertex_shader: matches.value_of_os("vertex-shader").map(PathBuf::from),
            fragment_shader: matches.value_of_os("fragment-shader").map(PathBuf::from),
            verbosity: matches.occurrences_of("verbose"),
        })
    }
}

/// Reads `MAJOR.MINOR`. Core profiles only exist from 3.2 on.
fn parse_gl_version(text: &str) -> Result<(u8, u8), Error> {
    let invalid = || Error::with_description(
        &format!("'{}' is not an OpenGL version; expected MAJOR.MINOR, 3.2 or newer", text),
        ErrorKind::InvalidValue,
    );

    let mut parts = text.splitn(2, '.');
    let major = parts.next().and_then(|p| p.trim().parse::<u8>().ok()).ok_or_else(invalid)?;
    let minor = parts.next().and_then(|p| p.trim().parse::<u8>().ok()).ok_or_else(invalid)?;

    if (major, minor) < (3, 2) {
        return Err(invalid());
    }

    Ok((major, minor))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_open_an_800x600_resizable_window() {
        let config = parse(vec!["glquad"]).unwrap();

        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.title, "glquad");
        assert_eq!(config.hints, WindowHints::default());
        assert_eq!(config.vertex_shader, None);
        assert_eq!(config.fragment_shader, None);
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn every_option_reaches_the_config() {
        let config = parse(vec![
            "glquad",
            "--width", "1024",
            "--height", "768",
            "-t", "Hello quad",
            "--vertex-shader", "shaders/wave.vert",
            "--fragment-shader", "shaders/wave.frag",
            "--gl-version", "4.6",
            "--fixed-size",
            "--no-vsync",
            "-vv",
        ]).unwrap();

        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.title, "Hello quad");
        assert_eq!(config.vertex_shader, Some(PathBuf::from("shaders/wave.vert")));
        assert_eq!(config.fragment_shader, Some(PathBuf::from("shaders/wave.frag")));
        assert_eq!(config.hints, WindowHints { resizable: false, vsync: false, gl_version: (4, 6) });
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn sizes_must_be_positive_numbers() {
        assert_eq!(parse(vec!["glquad", "--width", "0"]).unwrap_err().kind, ErrorKind::InvalidValue);
        assert_eq!(parse(vec!["glquad", "--height", "0"]).unwrap_err().kind, ErrorKind::InvalidValue);
        assert!(parse(vec!["glquad", "--width", "wide"]).is_err());
        assert!(parse(vec!["glquad", "--height", "1.5"]).is_err());
    }

    #[test]
    fn gl_versions_need_a_major_and_a_minor() {
        assert_eq!(parse_gl_version("3.3").unwrap(), (3, 3));
        assert_eq!(parse_gl_version("4.10").unwrap(), (4, 10));

        assert!(parse_gl_version("4").is_err());
        assert!(parse_gl_version("four.six").is_err());
        assert!(parse_gl_version("4.").is_err());
    }

    #[test]
    fn compatibility_only_versions_are_refused() {
        assert!(parse_gl_version("2.1").is_err());
        assert!(parse_gl_version("3.1").is_err());
        assert_eq!(parse_gl_version("3.2").unwrap(), (3, 2));
    }

    #[test]
    fn help_is_reported_as_an_error_for_the_caller_to_print() {
        let err = parse(vec!["glquad", "--help"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::HelpDisplayed);
    }
}

use rpmspec_extract::{error::ParseErr, MacroSet, RPMMacro, RPMSpec};
use std::{fs, path::Path};

const SCENARIO: &str = "\
Name:          go
Version:       1.1
Release:       1%{?dist}
Summary:       Go compiler and tools
Source0:       http://go.googlecode.com/files/%{name}%{version}.src.tar.gz
BuildRequires: ed
BuildRequires: bison, mercurial

%description
Go is a systems programming language.

%package  vim
Summary:  go syntax files for vim
Requires: %{name} = %{version}-%{release}

%package  emacs
Summary:  go syntax files for emacs
Requires: %{name} = %{version}-%{release}
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init();
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn end_to_end() {
    init_tracing();
    let spec = RPMSpec::parse_str(SCENARIO);
    assert_eq!(spec.name(), "go");
    assert_eq!(spec.version(), "1.1");
    assert_eq!(spec.release(), "1");

    let mut breqs = spec.build_requires();
    breqs.sort();
    assert_eq!(breqs, vec!["bison", "ed", "mercurial"]);

    assert!(spec.sources().unwrap()["0"].ends_with("go1.1.src.tar.gz"));
    assert_eq!(spec.subpackages(), vec!["vim", "emacs"]);
    // both subpackages require the same thing
    assert_eq!(spec.requires(), vec!["go = 1.1-1"]);
}

#[test]
fn parse_fixture_from_path() {
    init_tracing();
    let spec = RPMSpec::from_path("./tests/test.spec").unwrap();
    assert_eq!(spec.name(), "go");
    assert_eq!(spec.patches().unwrap()["0"], "diff0.patch");
    assert_eq!(spec.macros().get("booking_repo"), Some(&RPMMacro::new("booking_repo", "base", false)));
}

#[test]
fn empty_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "empty.spec", "");
    assert!(matches!(RPMSpec::from_path(&path), Err(ParseErr::EmptyInput)));
    // in-memory parsing does not care
    assert_eq!(RPMSpec::parse(fs::read(&path).unwrap()).name(), "");
}

#[test]
fn load_macro_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.macros", "# comment\n%define _prefix /usr\n%define dist .fc40\n");
    let b = write(dir.path(), "b.macros", "%global dist .fc41\n%_libdir %{_prefix}/lib64\n");

    let ms = MacroSet::from_paths([&a, &b]).unwrap();
    assert_eq!(ms.len(), 2);
    assert_eq!(ms.get("_prefix"), Some(&RPMMacro::new("_prefix", "/usr", false)));
    assert_eq!(ms.get("dist"), Some(&RPMMacro::new("dist", ".fc41", true)));

    let ms = MacroSet::from_paths([&b, &a]).unwrap();
    assert_eq!(ms.get("dist"), Some(&RPMMacro::new("dist", ".fc40", false)));

    assert!(MacroSet::from_paths(Vec::<&Path>::new()).unwrap().is_empty());
}

#[test]
fn loading_stops_at_first_bad_source() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.macros", "%define a 1\n");
    let res = MacroSet::from_paths([a.as_path(), dir.path()]);
    assert!(matches!(res, Err(ParseErr::NotAFile(_))));
    let res = MacroSet::from_paths([a, dir.path().join("missing")]);
    assert!(matches!(res, Err(ParseErr::IoError(_))));
}

#[test]
fn load_macro_glob() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "macros.10-base", "%define vendor hai\n%define a 1\n");
    write(dir.path(), "macros.20-override", "%define a 2\n");
    write(dir.path(), "README", "%define a 3\n");

    let pattern = format!("{}/macros.*", dir.path().display());
    let ms = MacroSet::load_glob(&pattern).unwrap();
    assert_eq!(ms.get("a").map(RPMMacro::value), Some("2"));
    assert_eq!(ms.get("vendor").map(RPMMacro::value), Some("hai"));

    fs::create_dir(dir.path().join("macros.d")).unwrap();
    assert!(matches!(MacroSet::load_glob(&pattern), Err(ParseErr::NotAFile(_))));
    assert!(matches!(MacroSet::load_glob("[unclosed"), Err(ParseErr::BadGlob { .. })));
}

#[test]
fn spec_over_predefined_macros() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let rc = write(dir.path(), "rpmmacros", "%define _prefix /usr\n%define name nope\n%define gourl https://golang.org\n");
    let base = MacroSet::from_paths([rc]).unwrap();

    let spec = RPMSpec::parse_with_macros(
        "%define gourl https://go.dev\nName: go\nVersion: 1.1\nSource0: %{gourl}/%{name}-%{version}.tar.gz\nPatch1: %{_prefix}.patch\n".as_bytes(),
        base,
    );
    assert_eq!(spec.sources().unwrap()["0"], "https://go.dev/go-1.1.tar.gz");
    assert_eq!(spec.patches().unwrap()["1"], "/usr.patch");
    assert_eq!(spec.macros().get("name").map(RPMMacro::value), Some("go"));
}

#[test]
fn written_macros_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let macros = [RPMMacro::new("debug_package", "%{nil}", true), RPMMacro::new("_hardened_build", "1", false)];
    let content = macros.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
    let path = write(dir.path(), "macros.out", &content);

    let ms = MacroSet::load_file(&path).unwrap();
    for m in macros {
        assert_eq!(ms.get(m.name()), Some(&m));
    }
}

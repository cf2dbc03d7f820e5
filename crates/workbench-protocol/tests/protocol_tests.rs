//! Protocol layer tests — URI parsing, options serialization, config validation, errors.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use workbench_protocol::*;

    // ─────────────────────────────────────────────────────────────────────
    // UriComponents
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn parse_provider_folder_uri() {
        let uri = UriComponents::parse("vscode-test-web://mount/").unwrap();
        assert_eq!(uri.scheme, "vscode-test-web");
        assert_eq!(uri.authority.as_deref(), Some("mount"));
        assert_eq!(uri.path.as_deref(), Some("/"));
        assert_eq!(uri.query, None);
    }

    #[test]
    fn parse_full_uri() {
        let uri = UriComponents::parse("https://example.com/a/b?x=1#frag").unwrap();
        assert_eq!(uri.scheme, "https");
        assert_eq!(uri.authority.as_deref(), Some("example.com"));
        assert_eq!(uri.path.as_deref(), Some("/a/b"));
        assert_eq!(uri.query.as_deref(), Some("x=1"));
        assert_eq!(uri.fragment.as_deref(), Some("frag"));
    }

    #[test]
    fn parse_file_uri_has_no_authority() {
        let uri = UriComponents::parse("file:///home/user/project").unwrap();
        assert_eq!(uri.scheme, "file");
        assert_eq!(uri.authority, None);
        assert_eq!(uri.path.as_deref(), Some("/home/user/project"));
    }

    #[test]
    fn parse_without_scheme_defaults_to_file() {
        let uri = UriComponents::parse("/tmp/folder").unwrap();
        assert_eq!(uri.scheme, "file");
        assert_eq!(uri.path.as_deref(), Some("/tmp/folder"));
    }

    #[test]
    fn parse_rejects_double_slash_path_without_authority() {
        // "file:////x" splits into an empty authority and path "//x"
        let err = UriComponents::parse("file:////x").unwrap_err();
        assert!(matches!(err, UriError::DoubleSlashPath(_)));
    }

    #[test]
    fn parse_decodes_escaped_components() {
        let uri = UriComponents::parse("file:///home/me/my%20project").unwrap();
        assert_eq!(uri.path.as_deref(), Some("/home/me/my project"));

        let uri = UriComponents::parse("https://ex%61mple.com/caf%C3%A9?q=a%26b#sec%201").unwrap();
        assert_eq!(uri.authority.as_deref(), Some("example.com"));
        assert_eq!(uri.path.as_deref(), Some("/café"));
        assert_eq!(uri.query.as_deref(), Some("q=a&b"));
        assert_eq!(uri.fragment.as_deref(), Some("sec 1"));
    }

    #[test]
    fn parse_keeps_undecodable_escapes() {
        let uri = UriComponents::parse("file:///data/%FF").unwrap();
        assert_eq!(uri.path.as_deref(), Some("/data/%FF"));
    }

    #[test]
    fn display_reassembles_components() {
        let uri = UriComponents::parse("https://example.com/a?x=1#f").unwrap();
        assert_eq!(uri.to_string(), "https://example.com/a?x=1#f");
    }

    #[test]
    fn from_parts_treats_empty_as_absent() {
        let uri = UriComponents::from_parts("https", Some("example.com"), Some(""), None, Some(""));
        assert_eq!(uri.path, None);
        assert_eq!(uri.fragment, None);
        assert_eq!(
            serde_json::to_value(&uri).unwrap(),
            json!({ "scheme": "https", "authority": "example.com" })
        );
    }

    #[test]
    fn from_parts_makes_path_absolute_under_authority() {
        let uri = UriComponents::from_parts("https", Some("example.com"), Some("cb"), Some("code=1"), None);
        assert_eq!(uri.path.as_deref(), Some("/cb"));
        assert_eq!(uri.query.as_deref(), Some("code=1"));
    }

    // ─────────────────────────────────────────────────────────────────────
    // WorkbenchOptions
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn empty_options_serialize_to_empty_object() {
        let options = WorkbenchOptions::default();
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));
    }

    #[test]
    fn options_use_camel_case_keys() {
        let ctx = AddressingContext::new("http", "localhost:3000");
        let options = WorkbenchOptions {
            additional_builtin_extensions: vec![ctx.at("/static/extensions/0/ext")],
            development_options: Some(DevelopmentOptions {
                extensions: vec![],
                extension_tests_path: Some(ctx.at("/static/devextensions/out/test")),
            }),
            folder_uri: None,
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value["additionalBuiltinExtensions"][0]["path"],
            "/static/extensions/0/ext"
        );
        assert_eq!(
            value["developmentOptions"]["extensionTestsPath"]["authority"],
            "localhost:3000"
        );
        assert!(value.get("folderUri").is_none());
    }

    #[test]
    fn addressing_context_origin() {
        let ctx = AddressingContext::new("http", "127.0.0.1:3000");
        assert_eq!(ctx.origin(), "http://127.0.0.1:3000");
    }

    // ─────────────────────────────────────────────────────────────────────
    // DeploymentConfig
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn default_config_is_valid() {
        DeploymentConfig::default().validate().unwrap();
    }

    #[test]
    fn tests_path_must_be_inside_development_path() {
        let config = DeploymentConfig {
            extension_development_path: Some(PathBuf::from("/ext")),
            extension_tests_path: Some(PathBuf::from("/other/tests")),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TestsPathOutsideDevelopmentPath { .. })
        ));
    }

    #[test]
    fn tests_path_may_not_climb_out_of_development_path() {
        let config = DeploymentConfig {
            extension_development_path: Some(PathBuf::from("/ext")),
            extension_tests_path: Some(PathBuf::from("/ext/../other/tests")),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TestsPathOutsideDevelopmentPath { .. })
        ));

        let config = DeploymentConfig {
            extension_development_path: Some(PathBuf::from("/ext")),
            extension_tests_path: Some(PathBuf::from("/ext/out/tests")),
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn tests_path_requires_development_path() {
        let config = DeploymentConfig {
            extension_tests_path: Some(PathBuf::from("/ext/tests")),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TestsPathWithoutDevelopmentPath)
        ));
    }

    #[test]
    fn cdn_build_requires_url() {
        let config = DeploymentConfig {
            build: BuildConfig::Cdn { uri: " ".into() },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingCdnUrl)));
    }

    #[test]
    fn invalid_folder_uri_is_rejected() {
        let config = DeploymentConfig {
            folder: Some(AutoOpenFolder::Uri("in valid://x".into())),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::FolderUri(_))));
    }

    #[test]
    fn folder_mount_path_only_for_mount_variant() {
        let mut config = DeploymentConfig {
            folder: Some(AutoOpenFolder::Mount(PathBuf::from("/work"))),
            ..Default::default()
        };
        assert_eq!(config.folder_mount_path(), Some(&PathBuf::from("/work")));
        config.folder = Some(AutoOpenFolder::Uri("file:///work".into()));
        assert_eq!(config.folder_mount_path(), None);
    }

    // ─────────────────────────────────────────────────────────────────────
    // HostError
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn error_status_codes() {
        assert_eq!(HostError::bad_request("x").status_code(), 400);
        assert_eq!(HostError::NotFound.status_code(), 400);
        assert_eq!(HostError::bad_gateway("down").status_code(), 502);
        assert_eq!(HostError::internal("boom").status_code(), 500);
    }

    #[test]
    fn not_found_is_indistinguishable_from_bad_request() {
        assert_eq!(
            HostError::NotFound.public_message(),
            HostError::bad_request("missing vscode-requestId").public_message()
        );
    }

    #[test]
    fn bad_gateway_keeps_remediation_hint() {
        let err = HostError::bad_gateway("start `yarn web`");
        assert_eq!(err.public_message(), "start `yarn web`");
    }
}

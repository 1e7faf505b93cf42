use std::io::Write;
use voxrag_agent::config::{load_config, ConfigError};

#[test]
fn test_sections_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[agent]
name = "kb-agent"

[openai]
api_key = "sk-file"
tts_voice = "verse"

[embedding]
model = "text-embedding-3-small"

[pinecone]
api_key = "pc-file"
index = "kb"
host = "kb-abc123.svc.pinecone.io"

[retrieval]
top_k = 6
score_threshold = 0.75

[logging]
level = "debug"
json = true
"#
    )
    .unwrap();

    let config = load_config(file.path().to_str()).unwrap();

    assert_eq!(config.agent.name, "kb-agent");
    assert_eq!(config.agent.greeting, "Greet the user and offer assistance.");
    assert_eq!(config.openai.tts_voice, "verse");
    assert_eq!(config.openai.llm_model, "gpt-4o-mini");
    assert_eq!(config.embedding_config().model, "text-embedding-3-small");
    assert_eq!(config.pinecone.host.as_deref(), Some("kb-abc123.svc.pinecone.io"));
    assert_eq!(config.retrieval.top_k, 6);
    assert_eq!(config.retrieval.text_key, "text");
    assert!(config.logging.json);
}

#[test]
fn test_malformed_file_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[retrieval]\ntop_k = \"many\"").unwrap();

    assert!(matches!(
        load_config(file.path().to_str()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path().join("none.toml").to_str()).unwrap();

    assert_eq!(config.agent.name, "voice-agent");
    assert_eq!(config.retrieval.top_k, 4);
}

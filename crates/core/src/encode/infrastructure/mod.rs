pub mod ffmpeg_cli_encoder;

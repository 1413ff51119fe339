mod stream_scenarios;
mod test_codec;

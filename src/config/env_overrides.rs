use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) =
            std::env::var("JUDGELOOP_API_KEY").or_else(|_| std::env::var("OPENROUTER_API_KEY"))
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(base_url) = std::env::var("JUDGELOOP_BASE_URL")
            && !base_url.is_empty()
        {
            self.base_url = base_url;
        }

        if let Ok(model) = std::env::var("JUDGELOOP_JUDGE_MODEL")
            && !model.is_empty()
        {
            self.judge.model = model;
        }

        if let Ok(model) = std::env::var("JUDGELOOP_COMBINER_MODEL")
            && !model.is_empty()
        {
            self.combiner.model = model;
        }

        if let Ok(model) = std::env::var("JUDGELOOP_GENERATOR_MODEL")
            && !model.is_empty()
        {
            self.generator.model = model;
        }
    }
}

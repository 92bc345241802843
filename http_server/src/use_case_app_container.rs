use use_cases::AppImpl;

pub struct UseCaseAppContainer {
    app: AppImpl,
}

impl UseCaseAppContainer {
    pub fn new(app: AppImpl) -> Self {
        Self { app }
    }

    pub fn get_client(&self) -> &AppImpl {
        &self.app
    }
}

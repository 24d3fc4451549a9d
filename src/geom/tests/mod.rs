mod test_frozen_basic;
mod test_model_basic;

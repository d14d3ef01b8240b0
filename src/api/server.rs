use std::convert::Infallible;

use warp::{Filter, Reply};

use crate::{
    attributes,
    context::Context,
    recipes,
    rejection::handle_rejection,
    schema::AttributeKind,
    users,
};

/// The complete HTTP surface, with rejections rendered as JSON.
pub fn routes(context: Context) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    users::routes(context.clone())
        .or(attributes::routes(AttributeKind::Tag, "tags", context.clone()))
        .or(attributes::routes(
            AttributeKind::Ingredient,
            "ingredients",
            context.clone(),
        ))
        .or(recipes::routes(context))
        .recover(handle_rejection)
        .with(warp::log("recipe_api::http"))
}

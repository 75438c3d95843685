use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    authz::{self, Action},
    domain::{InquiryStatus, UserRole},
    dto::inquiries::{
        CreateInquiryRequest, InquiryList, InquiryWithMessages, MessageView, PostMessageRequest,
    },
    entity::{
        inquiries::{ActiveModel as InquiryActive, Column as InquiryCol, Entity as Inquiries},
        messages::{ActiveModel as MessageActive, Column as MessageCol, Entity as Messages},
        products::{Column as ProductCol, Entity as Products},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Inquiry, Message},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn create_inquiry(
    state: &AppState,
    user: &AuthUser,
    payload: CreateInquiryRequest,
) -> AppResult<ApiResponse<Inquiry>> {
    ensure_role(user, UserRole::Buyer, "Only buyers can send inquiries")?;

    let mut errors = Vec::new();
    if payload.inquiry_type.trim().is_empty() {
        errors.push("inquiry_type is required".to_string());
    }
    if payload.message.trim().is_empty() {
        errors.push("message is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let inquiry = InquiryActive {
        id: Set(Uuid::new_v4()),
        buyer_id: Set(user.user_id),
        supplier_id: Set(payload.supplier_id),
        product_id: Set(payload.product_id),
        inquiry_type: Set(payload.inquiry_type),
        message: Set(payload.message),
        requirements: Set(payload.requirements),
        status: Set(InquiryStatus::Pending.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // Best-effort inquiry counter on the product, same contract as views.
    let orm = state.orm.clone();
    let product_id = inquiry.product_id;
    tokio::spawn(async move {
        let result = Products::update_many()
            .col_expr(
                ProductCol::Inquiries,
                Expr::col(ProductCol::Inquiries).add(1),
            )
            .filter(ProductCol::Id.eq(product_id))
            .exec(&orm)
            .await;
        if let Err(err) = result {
            tracing::warn!(error = %err, product_id = %product_id, "inquiry counter update failed");
        }
    });

    audit::record(
        &state.pool,
        user.user_id,
        "inquiry_create",
        "inquiries",
        serde_json::json!({ "inquiry_id": inquiry.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inquiry created",
        inquiry.into(),
        Some(Meta::empty()),
    ))
}

/// Buyers see the inquiries they opened, suppliers those addressed to them.
/// Any other role has no inquiry inbox.
pub async fn list_inquiries(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InquiryList>> {
    let condition = match user.role {
        UserRole::Buyer => Condition::all().add(InquiryCol::BuyerId.eq(user.user_id)),
        UserRole::Supplier => Condition::all().add(InquiryCol::SupplierId.eq(user.user_id)),
        UserRole::Admin => {
            return Err(AppError::Forbidden(
                "No inquiry inbox for this role".into(),
            ));
        }
    };

    let items = Inquiries::find()
        .filter(condition)
        .order_by_desc(InquiryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Inquiry::from)
        .collect();

    Ok(ApiResponse::success(
        "Inquiries",
        InquiryList { items },
        None,
    ))
}

pub async fn get_inquiry(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<InquiryWithMessages>> {
    let inquiry = Inquiries::find_by_id(id).one(&state.orm).await?;
    let inquiry = match inquiry {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    authz::inquiry_action(&inquiry, user, Action::Read)?;

    let messages = Messages::find()
        .filter(MessageCol::InquiryId.eq(id))
        .order_by_asc(MessageCol::CreatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(message, sender)| {
            let message: Message = message.into();
            MessageView {
                id: message.id,
                inquiry_id: message.inquiry_id,
                sender_id: message.sender_id,
                sender_email: sender.as_ref().map(|u| u.email.clone()),
                sender_role: sender.as_ref().map(|u| u.role.clone()),
                content: message.content,
                created_at: message.created_at,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Inquiry",
        InquiryWithMessages {
            inquiry: inquiry.into(),
            messages,
        },
        Some(Meta::empty()),
    ))
}

/// Appends to the thread. Does not touch the inquiry's own status.
pub async fn post_message(
    state: &AppState,
    user: &AuthUser,
    inquiry_id: Uuid,
    payload: PostMessageRequest,
) -> AppResult<ApiResponse<Message>> {
    let inquiry = Inquiries::find_by_id(inquiry_id).one(&state.orm).await?;
    let inquiry = match inquiry {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    authz::inquiry_action(&inquiry, user, Action::PostMessage)?;

    if payload.content.trim().is_empty() {
        return Err(AppError::Validation(vec!["content is required".to_string()]));
    }

    let message = MessageActive {
        id: Set(Uuid::new_v4()),
        inquiry_id: Set(inquiry_id),
        sender_id: Set(user.user_id),
        content: Set(payload.content),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Message sent",
        message.into(),
        Some(Meta::empty()),
    ))
}

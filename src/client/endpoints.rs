//! Typed wrappers over the Profitbase REST endpoints.
//!
//! Each wrapper writes its typed arguments first and then merges the caller's `query`/`body`
//! on top, so caller-supplied keys win on collision.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	client::{Body, Client, RequestSpec},
	http::{Transport, TransportResponse},
	query::{QueryParams, QueryValue, Scalar},
};

fn id_list<I>(ids: I) -> Option<QueryValue>
where
	I: IntoIterator,
	I::Item: Into<Scalar>,
{
	let ids = ids.into_iter().map(Into::into).collect::<Vec<Scalar>>();

	(!ids.is_empty()).then_some(QueryValue::Multi(ids))
}

fn body_of<const N: usize>(fields: [(&str, Value); N]) -> Body {
	fields.into_iter().map(|(key, value)| (key.to_owned(), value)).collect()
}

impl<T> Client<T>
where
	T: ?Sized + Transport,
{
	/// `GET house`
	pub async fn houses(&self, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("house").with_query(query)).await
	}

	/// `GET house/get-count-floors`
	pub async fn house_floor_count(
		&self,
		house_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("houseId", house_id);
		let spec = RequestSpec::get("house/get-count-floors").with_query(typed).with_query(query);

		self.request(&spec).await
	}

	/// `GET house/get-count-properties-on-floor`
	pub async fn house_floor_property_count(
		&self,
		house_id: i64,
		floor: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("houseId", house_id).with("floor", floor);
		let spec = RequestSpec::get("house/get-count-properties-on-floor")
			.with_query(typed)
			.with_query(query);

		self.request(&spec).await
	}

	/// `GET projects/{project_id}/houses` (API v3).
	pub async fn houses_legacy_v3(
		&self,
		project_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::get(format!("projects/{project_id}/houses")).with_query(query))
			.await
	}

	/// `POST house`
	pub async fn house_create(&self, body: Body, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::post("house").with_query(query).with_body(body)).await
	}

	/// `PUT house/{house_id}`
	pub async fn house_update(
		&self,
		house_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let spec = RequestSpec::put(format!("house/{house_id}")).with_query(query).with_body(body);

		self.request(&spec).await
	}

	/// `GET house/search`
	pub async fn houses_search(&self, text: &str, query: QueryParams) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("text", text);

		self.request(&RequestSpec::get("house/search").with_query(typed).with_query(query)).await
	}

	/// `GET projects`
	pub async fn projects(
		&self,
		is_archive: Option<bool>,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with_opt("isArchive", is_archive);

		self.request(&RequestSpec::get("projects").with_query(typed).with_query(query)).await
	}

	/// `POST projects`
	pub async fn project_create(
		&self,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::post("projects").with_query(query).with_body(body)).await
	}

	/// `PUT projects/{project_id}`
	pub async fn project_update(
		&self,
		project_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let spec =
			RequestSpec::put(format!("projects/{project_id}")).with_query(query).with_body(body);

		self.request(&spec).await
	}

	/// `GET projects/search`
	pub async fn projects_search(
		&self,
		text: &str,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("text", text);

		self.request(&RequestSpec::get("projects/search").with_query(typed).with_query(query)).await
	}

	/// `GET property`
	pub async fn properties(&self, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("property").with_query(query)).await
	}

	/// `POST properties`
	pub async fn property_create(
		&self,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::post("properties").with_query(query).with_body(body)).await
	}

	/// `PATCH properties/{property_id}`
	pub async fn property_update(
		&self,
		property_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let spec = RequestSpec::patch(format!("properties/{property_id}"))
			.with_query(query)
			.with_body(body);

		self.request(&spec).await
	}

	/// `GET property-types`
	pub async fn property_types(&self, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("property-types").with_query(query)).await
	}

	/// `GET property/deal/{deal_id}`
	pub async fn property_deal_list(
		&self,
		deal_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::get(format!("property/deal/{deal_id}")).with_query(query)).await
	}

	/// `GET property/history/{property_id}`
	pub async fn property_history(
		&self,
		property_id: i64,
		offset: Option<i64>,
		limit: Option<i64>,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with_opt("offset", offset).with_opt("limit", limit);
		let spec = RequestSpec::get(format!("property/history/{property_id}"))
			.with_query(typed)
			.with_query(query);

		self.request(&spec).await
	}

	/// `GET projects/{project_id}/houses/{house_id}/properties/list` (API v3).
	pub async fn properties_legacy_v3(
		&self,
		project_id: i64,
		house_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let path = format!("projects/{project_id}/houses/{house_id}/properties/list");

		self.request(&RequestSpec::get(path).with_query(query)).await
	}

	/// `GET get-property-deals`
	pub async fn property_deals<I>(
		&self,
		property_ids: I,
		query: QueryParams,
	) -> Result<TransportResponse>
	where
		I: IntoIterator,
		I::Item: Into<Scalar>,
	{
		let ids = property_ids.into_iter().map(Into::into).collect::<Vec<Scalar>>();
		let typed = QueryParams::new().with("ids[]", QueryValue::Multi(ids));

		self.request(&RequestSpec::get("get-property-deals").with_query(typed).with_query(query))
			.await
	}

	/// `POST properties/{property_id}/status-change`
	pub async fn property_status_change(
		&self,
		property_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let spec = RequestSpec::post(format!("properties/{property_id}/status-change"))
			.with_query(query)
			.with_body(body);

		self.request(&spec).await
	}

	/// `PATCH reserve/prolong`
	pub async fn reserve_prolong(
		&self,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::patch("reserve/prolong").with_query(query).with_body(body)).await
	}

	/// `GET board`
	pub async fn board(&self, house_id: i64, query: QueryParams) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("houseId", house_id);

		self.request(&RequestSpec::get("board").with_query(typed).with_query(query)).await
	}

	/// `GET plan`
	pub async fn plans(&self, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("plan").with_query(query)).await
	}

	/// `GET projects/{project_id}/houses/{house_id}/presets` (API v3).
	pub async fn presets_legacy(
		&self,
		project_id: i64,
		house_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let path = format!("projects/{project_id}/houses/{house_id}/presets");

		self.request(&RequestSpec::get(path).with_query(query)).await
	}

	/// `GET facade`
	pub async fn facades(&self, house_id: i64, query: QueryParams) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("houseId", house_id);

		self.request(&RequestSpec::get("facade").with_query(typed).with_query(query)).await
	}

	/// `GET floor`
	pub async fn floors(&self, house_id: i64, query: QueryParams) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("houseId", house_id);

		self.request(&RequestSpec::get("floor").with_query(typed).with_query(query)).await
	}

	/// `GET special-offer`
	pub async fn special_offers(
		&self,
		is_archived: Option<bool>,
		is_discounted: Option<bool>,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new()
			.with_opt("isArchived", is_archived)
			.with_opt("isDiscounted", is_discounted);

		self.request(&RequestSpec::get("special-offer").with_query(typed).with_query(query)).await
	}

	/// `GET crm/deals`
	pub async fn crm_deals(
		&self,
		deal_id: Option<i64>,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with_opt("dealId", deal_id);

		self.request(&RequestSpec::get("crm/deals").with_query(typed).with_query(query)).await
	}

	/// `GET crm/deals/property/{property_id}`
	pub async fn crm_property_deals(
		&self,
		property_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let path = format!("crm/deals/property/{property_id}");

		self.request(&RequestSpec::get(path).with_query(query)).await
	}

	/// `POST crm/addPropertyDeal`
	pub async fn crm_property_deal_add(
		&self,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::post("crm/addPropertyDeal").with_query(query).with_body(body))
			.await
	}

	/// `POST crm/removePropertyDeal`
	pub async fn crm_property_deal_remove(
		&self,
		deal_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let spec = RequestSpec::post("crm/removePropertyDeal")
			.with_query(query)
			.with_body(body_of([("dealId", deal_id.into())]))
			.with_body(body);

		self.request(&spec).await
	}

	/// `GET crm/update/deal/{deal_id}/property/{property_id}`
	pub async fn crm_deal_property_update(
		&self,
		deal_id: i64,
		property_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let path = format!("crm/update/deal/{deal_id}/property/{property_id}");

		self.request(&RequestSpec::get(path).with_query(query)).await
	}

	/// `GET crm/syncPropertyStatus`
	pub async fn crm_property_status_sync(
		&self,
		deal_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("dealId", deal_id);
		let spec = RequestSpec::get("crm/syncPropertyStatus").with_query(typed).with_query(query);

		self.request(&spec).await
	}

	/// `POST orders`
	pub async fn order_create(&self, body: Body, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::post("orders").with_query(query).with_body(body)).await
	}

	/// `POST history`
	pub async fn history(&self, body: Body, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::post("history").with_query(query).with_body(body)).await
	}

	/// `GET custom-status/list`
	pub async fn custom_statuses(
		&self,
		crm_id: &str,
		status_id: Option<&str>,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("crm", crm_id).with_opt("id", status_id);

		self.request(&RequestSpec::get("custom-status/list").with_query(typed).with_query(query))
			.await
	}

	/// `GET filter`
	pub async fn filters(&self, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("filter").with_query(query)).await
	}

	/// `GET filter/facings`; an empty `house_ids` sends no house filter.
	pub async fn filter_facings<I>(
		&self,
		house_ids: I,
		query: QueryParams,
	) -> Result<TransportResponse>
	where
		I: IntoIterator,
		I::Item: Into<Scalar>,
	{
		let typed = QueryParams::new().with_opt("houseId[]", id_list(house_ids));

		self.request(&RequestSpec::get("filter/facings").with_query(typed).with_query(query)).await
	}

	/// `GET filter/property-specifications`
	pub async fn filter_property_specifications(
		&self,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("filter/property-specifications").with_query(query)).await
	}

	/// `GET property-specification`; an empty `property_ids` sends no property filter.
	pub async fn property_specifications<I>(
		&self,
		property_ids: I,
		query: QueryParams,
	) -> Result<TransportResponse>
	where
		I: IntoIterator,
		I::Item: Into<Scalar>,
	{
		let typed = QueryParams::new().with_opt("propertyIds[]", id_list(property_ids));
		let spec = RequestSpec::get("property-specification").with_query(typed).with_query(query);

		self.request(&spec).await
	}

	/// `GET property-specification/list`
	pub async fn property_specification_list(
		&self,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("property-specification/list").with_query(query)).await
	}

	/// `GET property-specification/house`
	pub async fn property_specification_house(
		&self,
		house_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("houseId", house_id);
		let spec =
			RequestSpec::get("property-specification/house").with_query(typed).with_query(query);

		self.request(&spec).await
	}

	/// `GET queue-reserve/list`
	pub async fn queue_reserve_list(
		&self,
		property_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("propertyId", property_id);

		self.request(&RequestSpec::get("queue-reserve/list").with_query(typed).with_query(query))
			.await
	}

	/// `POST queue-reserve/delete`
	pub async fn queue_reserve_delete(
		&self,
		deal_queue_item_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with("id", deal_queue_item_id);
		let spec = RequestSpec::post("queue-reserve/delete")
			.with_query(typed)
			.with_query(query)
			.with_body(body);

		self.request(&spec).await
	}

	/// `POST queue-reserve`; `deal_id` may be numeric or a CRM string identifier.
	pub async fn queue_reserve_create(
		&self,
		property_id: i64,
		deal_id: impl Into<Value>,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = body_of([("propertyId", property_id.into()), ("dealId", deal_id.into())]);
		let spec = RequestSpec::post("queue-reserve")
			.with_query(query)
			.with_body(typed)
			.with_body(body);

		self.request(&spec).await
	}

	/// `POST queue-reserve/change-position`
	pub async fn queue_reserve_change_position(
		&self,
		source_queue_item_id: i64,
		target_queue_item_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = body_of([
			("queueId", source_queue_item_id.into()),
			("queueDropId", target_queue_item_id.into()),
		]);
		let spec = RequestSpec::post("queue-reserve/change-position")
			.with_query(query)
			.with_body(typed)
			.with_body(body);

		self.request(&spec).await
	}

	/// `GET render`
	pub async fn renders(
		&self,
		project_id: Option<i64>,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let typed = QueryParams::new().with_opt("projectId", project_id);

		self.request(&RequestSpec::get("render").with_query(typed).with_query(query)).await
	}

	/// `GET user/info`
	pub async fn user_info(&self, query: QueryParams) -> Result<TransportResponse> {
		self.request(&RequestSpec::get("user/info").with_query(query)).await
	}

	/// `PATCH user/{user_id}/access`
	pub async fn user_access_update(
		&self,
		user_id: i64,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let spec =
			RequestSpec::patch(format!("user/{user_id}/access")).with_query(query).with_body(body);

		self.request(&spec).await
	}

	/// `GET user/{user_id}/password/forgot`
	pub async fn user_password_forgot(
		&self,
		user_id: i64,
		query: QueryParams,
	) -> Result<TransportResponse> {
		let path = format!("user/{user_id}/password/forgot");

		self.request(&RequestSpec::get(path).with_query(query)).await
	}

	/// `POST versions/find`
	pub async fn stock_versions_find(
		&self,
		body: Body,
		query: QueryParams,
	) -> Result<TransportResponse> {
		self.request(&RequestSpec::post("versions/find").with_query(query).with_body(body)).await
	}
}
